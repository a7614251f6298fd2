//! Error types for the flipbook-printer library.
//!
//! Only failures that stop a job are modelled here. Two situations that look
//! like errors are deliberately *not* part of [`FlipbookError`]:
//!
//! * a source that opens but yields no frames: the empty batch flows on to
//!   the renderer and produces an empty document;
//! * a live recording that is terminated while still recording: the batch
//!   is discarded and reported through
//!   [`crate::progress::FlipbookProgressCallback::on_recording_aborted`].
//!
//! The helpers [`FlipbookError::is_source_unavailable`] and
//! [`FlipbookError::is_render_failure`] fold the variants into the two
//! caller-facing categories: "nothing was acquired" and "a batch was acquired
//! but its document could not be produced".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the flipbook-printer library.
#[derive(Debug, Error)]
pub enum FlipbookError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// Input video or GIF was not found at the given path.
    #[error("Video file not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// The frame source exists (or is a device) but could not be opened.
    #[error("Cannot open frame source '{source_id}': {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// The source opened but failed while delivering a frame.
    #[error("Reading frame {frame} from '{source_id}' failed: {detail}")]
    FrameReadFailed {
        source_id: String,
        frame: usize,
        detail: String,
    },

    // ── Render errors ─────────────────────────────────────────────────────
    /// PNG encoding of a transformed card failed.
    #[error("Encoding card {frame} as PNG failed: {source}")]
    EncodeFailed {
        frame: usize,
        #[source]
        source: image::ImageError,
    },

    /// The document container could not be assembled.
    #[error("Failed to write flipbook document '{path}': {detail}")]
    DocumentWriteFailed { path: PathBuf, detail: String },

    /// Could not create, write or move an output file into place.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The GIF sidecar of a live recording could not be written.
    #[error("Failed to write GIF '{path}': {detail}")]
    GifWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlipbookError {
    /// True when no batch could be acquired because the source never opened.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            FlipbookError::SourceNotFound { .. } | FlipbookError::SourceUnavailable { .. }
        )
    }

    /// True when a batch existed but producing its document failed.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            FlipbookError::EncodeFailed { .. }
                | FlipbookError::DocumentWriteFailed { .. }
                | FlipbookError::OutputWriteFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unavailable_display() {
        let e = FlipbookError::SourceUnavailable {
            source_id: "camera 1".into(),
            reason: "device busy".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("camera 1"), "got: {msg}");
        assert!(msg.contains("device busy"), "got: {msg}");
        assert!(e.is_source_unavailable());
        assert!(!e.is_render_failure());
    }

    #[test]
    fn not_found_is_source_unavailable() {
        let e = FlipbookError::SourceNotFound {
            path: PathBuf::from("clip.mp4"),
        };
        assert!(e.is_source_unavailable());
        assert!(e.to_string().contains("clip.mp4"));
    }

    #[test]
    fn write_failures_are_render_failures() {
        let e = FlipbookError::OutputWriteFailed {
            path: PathBuf::from("out.docx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.is_render_failure());
        assert!(e.to_string().contains("out.docx"));

        let e = FlipbookError::DocumentWriteFailed {
            path: PathBuf::from("out.docx"),
            detail: "zip".into(),
        };
        assert!(e.is_render_failure());
    }

    #[test]
    fn gif_failure_is_neither_category() {
        let e = FlipbookError::GifWriteFailed {
            path: PathBuf::from("rec.gif"),
            detail: "disk full".into(),
        };
        assert!(!e.is_render_failure());
        assert!(!e.is_source_unavailable());
    }
}
