//! Image encoding: finished card → PNG bytes for the document.
//!
//! PNG is lossless, so the one-pixel cut guide and the stamped digits keep
//! hard edges on paper instead of smearing into compression artefacts.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode a finished card as an in-memory PNG.
pub fn encode_card(card: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    card.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} card → {} bytes PNG",
        card.width(),
        card.height(),
        buf.len()
    );
    Ok(buf)
}
