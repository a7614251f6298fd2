//! Animated GIFs decoded in-process by the `image` crate.
//!
//! The decoder composes every GIF frame onto the full logical screen, so all
//! frames come out with the same dimensions. Transparent pixels are
//! flattened onto white, the colour of the paper they end up on.

use super::FrameSource;
use crate::error::FlipbookError;
use crate::frame::Frame;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frames, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Frames of one GIF file, in playback order.
pub struct GifSource {
    id: String,
    frames: Frames<'static>,
    read: usize,
}

impl GifSource {
    pub fn open(path: &Path) -> Result<Self, FlipbookError> {
        let id = path.display().to_string();
        let file = File::open(path).map_err(|e| FlipbookError::SourceUnavailable {
            source_id: id.clone(),
            reason: e.to_string(),
        })?;
        let decoder =
            GifDecoder::new(BufReader::new(file)).map_err(|e| FlipbookError::SourceUnavailable {
                source_id: id.clone(),
                reason: format!("not a readable GIF: {e}"),
            })?;
        info!("Opened GIF '{}'", id);
        Ok(Self {
            id,
            frames: decoder.into_frames(),
            read: 0,
        })
    }
}

impl FrameSource for GifSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_next(&mut self) -> Result<Option<Frame>, FlipbookError> {
        match self.frames.next() {
            None => Ok(None),
            Some(Ok(frame)) => {
                self.read += 1;
                let rgba = frame.into_buffer();
                debug!(
                    "GIF frame {} → {}x{}",
                    self.read,
                    rgba.width(),
                    rgba.height()
                );
                Ok(Some(flatten_over_white(&rgba)))
            }
            Some(Err(e)) => Err(FlipbookError::FrameReadFailed {
                source_id: self.id.clone(),
                frame: self.read + 1,
                detail: e.to_string(),
            }),
        }
    }
}

/// Composite straight-alpha RGBA over an opaque white background.
pub fn flatten_over_white(src: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let a = u16::from(a);
        let inv = 255 - a;
        let blend = |c: u8| (mul_div255(u16::from(c), a) + mul_div255(255, inv)).min(255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}
