//! Frames and frame batches.
//!
//! A [`Frame`] is an 8-bit RGB raster. Sources deliver frames in RGB order,
//! so nothing downstream (PNG cards, GIF sidecar) needs a channel swap.
//!
//! A [`FrameBatch`] is the unit handed from acquisition to rendering: it is
//! appended to while open, then frozen and moved to the renderer, which
//! consumes it exactly once.

use image::RgbImage;

/// One captured image, immutable once it is part of a batch.
pub type Frame = RgbImage;

/// Ordered frames destined for a single flipbook document.
///
/// Batch order is display order is printed numbering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBatch {
    frames: Vec<Frame>,
}

impl FrameBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame at the end of the batch.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in capture order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Pixel dimensions of the first frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| f.dimensions())
    }

    /// True when every frame shares the first frame's dimensions.
    pub fn is_uniform(&self) -> bool {
        match self.dimensions() {
            Some(dims) => self.frames.iter().all(|f| f.dimensions() == dims),
            None => true,
        }
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl From<Vec<Frame>> for FrameBatch {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for FrameBatch {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Crop a frame to a centred square with side `min(width, height)`.
///
/// The longer axis loses `|width - height| / 2` pixels at its start (rounded
/// down) and the rest at its end. Square frames are returned unchanged.
/// Never resizes.
pub fn square_crop(frame: Frame) -> Frame {
    let (w, h) = frame.dimensions();
    if w == h {
        return frame;
    }
    let side = w.min(h);
    let (x, y) = if w > h {
        ((w - h) / 2, 0)
    } else {
        (0, (h - w) / 2)
    };
    image::imageops::crop_imm(&frame, x, y, side, side).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Frame whose pixel at (x, y) encodes its own coordinates.
    fn coord_frame(w: u32, h: u32) -> Frame {
        RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn landscape_crops_horizontally_centred() {
        let out = square_crop(coord_frame(64, 48));
        assert_eq!(out.dimensions(), (48, 48));
        // offset = (64 - 48) / 2 = 8
        assert_eq!(out.get_pixel(0, 0), &Rgb([8, 0, 7]));
        assert_eq!(out.get_pixel(47, 47), &Rgb([55, 47, 7]));
    }

    #[test]
    fn portrait_crops_vertically_centred() {
        let out = square_crop(coord_frame(30, 50));
        assert_eq!(out.dimensions(), (30, 30));
        // offset = (50 - 30) / 2 = 10
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 10, 7]));
        assert_eq!(out.get_pixel(29, 29), &Rgb([29, 39, 7]));
    }

    #[test]
    fn odd_difference_rounds_offset_down() {
        let out = square_crop(coord_frame(11, 8));
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(out.get_pixel(0, 0), &Rgb([1, 0, 7]));
    }

    #[test]
    fn square_input_is_unchanged() {
        let input = coord_frame(20, 20);
        let out = square_crop(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn batch_keeps_insertion_order() {
        let mut batch = FrameBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.dimensions(), None);
        for i in 0..3u8 {
            batch.push(RgbImage::from_pixel(4, 2, Rgb([i, i, i])));
        }
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.dimensions(), Some((4, 2)));
        assert!(batch.is_uniform());
        let firsts: Vec<u8> = batch.frames().iter().map(|f| f.get_pixel(0, 0)[0]).collect();
        assert_eq!(firsts, vec![0, 1, 2]);
    }

    #[test]
    fn mixed_dimensions_are_not_uniform() {
        let batch: FrameBatch = vec![RgbImage::new(4, 4), RgbImage::new(4, 5)]
            .into_iter()
            .collect();
        assert!(!batch.is_uniform());
    }
}
