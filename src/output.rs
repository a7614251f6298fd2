//! Output artefacts: render statistics, file naming and atomic writes.

use crate::document::PageFit;
use crate::error::FlipbookError;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix of every flipbook document.
pub const FLIPBOOK_SUFFIX: &str = "_flipbook.docx";

/// Suffix of the GIF sidecar written for live recordings.
pub const RECORDING_SUFFIX: &str = "_recording.gif";

/// Summary of one render call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderStats {
    /// Where the document was saved.
    pub output_path: PathBuf,
    /// Frames in the batch.
    pub frames: usize,
    /// Cards placed in the document (equals `frames`).
    pub cards: usize,
    /// Binding margin of the first card in pixels (0 for an empty batch).
    pub left_margin_px: u32,
    /// Estimated flow of the cards onto sheets.
    pub fit: PageFit,
    /// Size of the saved document.
    pub bytes_written: u64,
    /// Time spent transforming and encoding cards.
    pub render_duration_ms: u64,
    /// Wall-clock time of the whole call, save included.
    pub total_duration_ms: u64,
}

/// Document path for a flipbook made from an existing video.
///
/// The extension of `video` is replaced by [`FLIPBOOK_SUFFIX`] and the file
/// lands next to the video: `clips/jump.mp4` → `clips/jump_flipbook.docx`.
pub fn flipbook_path_for_video(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    video.with_file_name(format!("{stem}{FLIPBOOK_SUFFIX}"))
}

/// Names for the artefacts of one live recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPaths {
    pub flipbook: PathBuf,
    pub gif: PathBuf,
}

/// Artefact paths for a live recording stopped at local time `at`.
///
/// `20240131153005_flipbook.docx` and `20240131153005_recording.gif`.
pub fn recording_paths<Tz>(dir: &Path, at: &chrono::DateTime<Tz>) -> RecordingPaths
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    paths_for_stamp(dir, &at.format("%Y%m%d%H%M%S").to_string())
}

/// Like [`recording_paths`], but never names an existing file: two
/// recordings stopped within the same second get `-2`, `-3`, … appended.
pub fn unique_recording_paths<Tz>(dir: &Path, at: &chrono::DateTime<Tz>) -> RecordingPaths
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stamp = at.format("%Y%m%d%H%M%S").to_string();
    let mut paths = paths_for_stamp(dir, &stamp);
    let mut n = 1u32;
    while paths.flipbook.exists() || paths.gif.exists() {
        n += 1;
        paths = paths_for_stamp(dir, &format!("{stamp}-{n}"));
    }
    paths
}

fn paths_for_stamp(dir: &Path, stamp: &str) -> RecordingPaths {
    RecordingPaths {
        flipbook: dir.join(format!("{stamp}{FLIPBOOK_SUFFIX}")),
        gif: dir.join(format!("{stamp}{RECORDING_SUFFIX}")),
    }
}

/// Write `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed into place only after it was fully written, so readers never
/// observe a truncated file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<u64, FlipbookError> {
    let fail = |source: std::io::Error| FlipbookError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;

    Ok(bytes.len() as u64)
}
