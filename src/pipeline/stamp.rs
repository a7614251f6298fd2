//! Page-recovery numbering.
//!
//! Each card carries its 1-based position in the lower-left corner so a
//! dropped stack of cut-out cards can be put back in order. Digits come from
//! the bundled DejaVu Sans Mono Bold face, rasterised once with `fontdue` at
//! [`FONT_PX`] and drawn in solid [`TEXT_COLOR`]: glyph coverage is
//! thresholded rather than blended so the number prints crisply on any
//! artwork.

use crate::error::FlipbookError;
use fontdue::{Font, FontSettings, Metrics};
use image::{Rgb, RgbImage};
use std::sync::OnceLock;

/// Colour of the stamped digits.
pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Font size in pixels (em height).
pub const FONT_PX: f32 = 90.0;

/// Distance of the text from the left edge and of its baseline from the
/// bottom edge.
pub const TEXT_INSET_PX: u32 = 10;

/// Coverage from which a glyph pixel counts as ink.
const INK_THRESHOLD: u8 = 128;

const FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono-Bold.ttf");

struct Glyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

/// Rasterised `0`..=`9`, indexed by digit value.
fn digits() -> Result<&'static [Glyph], FlipbookError> {
    static DIGITS: OnceLock<Result<Vec<Glyph>, String>> = OnceLock::new();
    DIGITS
        .get_or_init(|| {
            let font = Font::from_bytes(FONT_BYTES, FontSettings::default())
                .map_err(|e| format!("bundled stamp font failed to load: {e}"))?;
            Ok(('0'..='9')
                .map(|ch| {
                    let (metrics, coverage) = font.rasterize(ch, FONT_PX);
                    Glyph { metrics, coverage }
                })
                .collect())
        })
        .as_deref()
        .map_err(|e| FlipbookError::Internal(e.clone()))
}

/// Glyphs of `number` with their left edge relative to the text origin.
fn layout(number: usize) -> Result<Vec<(i64, &'static Glyph)>, FlipbookError> {
    let digits = digits()?;
    let mut pen = 0.0f32;
    number
        .to_string()
        .bytes()
        .map(|b| -> Result<(i64, &'static Glyph), FlipbookError> {
            let glyph = digits
                .get(usize::from(b - b'0'))
                .ok_or_else(|| FlipbookError::Internal(format!("no glyph for '{}'", b as char)))?;
            let left = pen.round() as i64 + i64::from(glyph.metrics.xmin);
            pen += glyph.metrics.advance_width;
            Ok((left, glyph))
        })
        .collect()
}

/// Bounding box of the stamped ink, in image coordinates. `y` may be
/// negative on cards shorter than the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Where [`stamp_number`] puts `number` on an image `image_height` tall.
pub fn text_box(image_height: u32, number: usize) -> Result<TextBox, FlipbookError> {
    let glyphs = layout(number)?;
    let origin = i64::from(TEXT_INSET_PX);
    let baseline = i64::from(image_height) - i64::from(TEXT_INSET_PX);

    let left = glyphs.iter().map(|(x, _)| *x).min().unwrap_or(0);
    let right = glyphs
        .iter()
        .map(|(x, g)| x + g.metrics.width as i64)
        .max()
        .unwrap_or(0);
    let top = glyphs
        .iter()
        .map(|(_, g)| i64::from(g.metrics.ymin) + g.metrics.height as i64)
        .max()
        .unwrap_or(0);
    let bottom = glyphs
        .iter()
        .map(|(_, g)| i64::from(g.metrics.ymin))
        .min()
        .unwrap_or(0);

    Ok(TextBox {
        x: origin + left,
        y: baseline - top,
        width: (right - left).max(0) as u32,
        height: (top - bottom).max(0) as u32,
    })
}

/// Draw `number` in the lower-left area of `img`. Ink falling outside the
/// image is clipped.
pub fn stamp_number(img: &mut RgbImage, number: usize) -> Result<(), FlipbookError> {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let origin = i64::from(TEXT_INSET_PX);
    let baseline = h - i64::from(TEXT_INSET_PX);

    for (left, glyph) in layout(number)? {
        let m = &glyph.metrics;
        let top = baseline - i64::from(m.ymin) - m.height as i64;
        for (i, &coverage) in glyph.coverage.iter().enumerate() {
            if coverage < INK_THRESHOLD {
                continue;
            }
            let x = origin + left + (i % m.width) as i64;
            let y = top + (i / m.width) as i64;
            if (0..w).contains(&x) && (0..h).contains(&y) {
                img.put_pixel(x as u32, y as u32, TEXT_COLOR);
            }
        }
    }
    Ok(())
}
