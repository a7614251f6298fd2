//! Cut guide: a one-pixel grey outline around the whole card.

use image::{imageops, Rgb, RgbImage};

/// Colour of the cut line.
pub const CUT_GUIDE_COLOR: Rgb<u8> = Rgb([200, 200, 200]);

/// Width of the cut line on each edge.
///
/// Fixed; the configured `border_linewidth_px` is not applied.
pub const CUT_GUIDE_WIDTH: u32 = 1;

/// Return a copy of `card` surrounded by the cut guide on all four edges.
pub fn add_cut_guide(card: &RgbImage) -> RgbImage {
    let (w, h) = card.dimensions();
    let mut out = RgbImage::from_pixel(
        w + 2 * CUT_GUIDE_WIDTH,
        h + 2 * CUT_GUIDE_WIDTH,
        CUT_GUIDE_COLOR,
    );
    imageops::replace(
        &mut out,
        card,
        i64::from(CUT_GUIDE_WIDTH),
        i64::from(CUT_GUIDE_WIDTH),
    );
    out
}
