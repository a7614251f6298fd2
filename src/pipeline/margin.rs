//! Left-margin extension: the white strip the printed cards are bound on.
//!
//! The strip width is given in centimetres and converted with the frame's own
//! pixel height as the scale reference (see
//! [`LayoutParameters::left_margin_pixels`]). Every card is printed at the
//! same physical height, so a frame of `h` pixels maps to `target_height_cm`
//! and the strip comes out at `left_margin_cm` on paper.

use crate::config::LayoutParameters;
use crate::error::FlipbookError;
use crate::frame::Frame;
use image::{imageops, Rgb, RgbImage};
use tracing::debug;

/// Fill colour of the binding margin.
pub const MARGIN_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Widest card, margin included, the renderer will allocate.
pub const MAX_CARD_WIDTH_PX: u32 = 1 << 16;

/// Return a copy of `frame` with a white strip of `width_px` on its left edge.
pub fn extend_left(frame: &Frame, width_px: u32) -> Result<RgbImage, FlipbookError> {
    let (w, h) = frame.dimensions();
    let total = w
        .checked_add(width_px)
        .filter(|&t| t <= MAX_CARD_WIDTH_PX)
        .ok_or_else(|| {
            FlipbookError::InvalidConfig(format!(
                "left margin of {width_px} px makes a {w} px frame wider than {MAX_CARD_WIDTH_PX} px"
            ))
        })?;
    let mut out = RgbImage::from_pixel(total, h, MARGIN_COLOR);
    imageops::replace(&mut out, frame, i64::from(width_px), 0);
    Ok(out)
}

/// Extend `frame` by the margin `params` asks for; returns the image and the
/// margin width that was applied.
pub fn apply(frame: &Frame, params: &LayoutParameters) -> Result<(RgbImage, u32), FlipbookError> {
    let px = params.left_margin_pixels(frame.height()).ok_or_else(|| {
        FlipbookError::InvalidConfig(format!(
            "left margin {} cm at {} cm card height has no pixel width",
            params.left_margin_cm, params.target_height_cm
        ))
    })?;
    debug!("left margin: {} cm → {} px", params.left_margin_cm, px);
    Ok((extend_left(frame, px)?, px))
}
