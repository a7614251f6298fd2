//! Frame sources: where acquisition reads its frames from.
//!
//! A [`FrameSource`] is opened by its constructor, read with
//! [`FrameSource::read_next`] until it reports end of stream, and released
//! when dropped. Scoping release to `Drop` means a device or decoder process
//! is freed exactly once on every exit path, error paths included.
//!
//! | Source | Backend |
//! |--------|---------|
//! | [`ffmpeg::FfmpegSource`] | video files and live cameras through the system `ffmpeg` |
//! | [`gif::GifSource`]       | animated GIFs decoded in-process |
//! | [`memory::MemorySource`] | frames already in memory |

pub mod ffmpeg;
pub mod gif;
pub mod memory;

use crate::error::FlipbookError;
use crate::frame::Frame;
use std::path::Path;
use tracing::debug;

/// A sequential supplier of frames.
pub trait FrameSource {
    /// Human-readable identifier for logs and errors.
    fn id(&self) -> &str;

    /// Next frame, or `Ok(None)` once the source is exhausted.
    fn read_next(&mut self) -> Result<Option<Frame>, FlipbookError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn read_next(&mut self) -> Result<Option<Frame>, FlipbookError> {
        (**self).read_next()
    }
}

/// True when `path` names a GIF by extension.
pub fn is_gif(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("gif"))
        .unwrap_or(false)
}

/// Open an existing video or GIF file.
///
/// GIFs are decoded in-process; everything else goes through ffmpeg.
pub fn open_video(path: &Path) -> Result<Box<dyn FrameSource>, FlipbookError> {
    if !path.exists() {
        return Err(FlipbookError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    if is_gif(path) {
        debug!("Opening '{}' with the GIF decoder", path.display());
        Ok(Box::new(gif::GifSource::open(path)?))
    } else {
        debug!("Opening '{}' with ffmpeg", path.display());
        Ok(Box::new(ffmpeg::FfmpegSource::open_file(path)?))
    }
}
