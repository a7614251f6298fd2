//! GIF sidecar for live recordings.
//!
//! Cards keep RGB frames; the GIF encoder takes RGBA, so every frame is
//! widened with an opaque alpha channel on the way in.

use crate::error::FlipbookError;
use crate::frame::Frame;
use crate::output::write_atomic;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame as GifFrame};
use std::path::Path;
use tracing::{info, warn};

/// Encode `frames` as an endlessly looping GIF played back at `fps`.
pub fn encode_gif(frames: &[Frame], fps: u32) -> Result<Vec<u8>, image::ImageError> {
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite)?;
        for frame in frames {
            let rgba = DynamicImage::ImageRgb8(frame.clone()).into_rgba8();
            encoder.encode_frame(GifFrame::from_parts(rgba, 0, 0, delay))?;
        }
    }
    Ok(bytes)
}

/// Write the recording to `path` as a GIF. Returns bytes written; an empty
/// recording writes nothing and returns 0.
pub fn write_gif(frames: &[Frame], fps: u32, path: &Path) -> Result<u64, FlipbookError> {
    if frames.is_empty() {
        warn!("Empty recording, no GIF written to '{}'", path.display());
        return Ok(0);
    }
    let bytes = encode_gif(frames, fps).map_err(|e| FlipbookError::GifWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let written = write_atomic(path, &bytes)?;
    info!(
        "GIF saved to '{}' ({} frames at {} fps)",
        path.display(),
        frames.len(),
        fps
    );
    Ok(written)
}
