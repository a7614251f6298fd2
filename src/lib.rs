//! # flipbook-printer
//!
//! Turn a camera recording, a video or an animated GIF into a printable
//! flipbook: one numbered card per frame, laid out side by side in a `.docx`
//! ready to print, cut apart and flip through.
//!
//! ## Pipeline Overview
//!
//! ```text
//! camera / video / GIF
//!  │
//!  ├─ 1. Acquire  finite source (whole file) or live toggle (start/stop)
//!  ├─ 2. Margin   white binding strip, left_margin cm at target_height scale
//!  ├─ 3. Border   1 px grey cut guide around the card
//!  ├─ 4. Stamp    1-based card number, lower-left
//!  ├─ 5. Encode   PNG in memory
//!  └─ 6. Layout   one run of inline cards at target_height, sheet margins
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flipbook_printer::{run_video, FlipbookConfig, LayoutParameters};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FlipbookConfig::builder()
//!         .layout(LayoutParameters::builder().target_height_cm(4.0).build()?)
//!         .build()?;
//!     let stats = run_video(Path::new("jump.mp4"), &config, None)?;
//!     eprintln!("{} cards on ~{} sheets", stats.cards, stats.fit.sheets);
//!     Ok(())
//! }
//! ```
//!
//! Frames already in memory go straight to [`render`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flipbook` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! flipbook-printer = { version = "0.1", default-features = false }
//! ```
//!
//! Video files other than GIF and live cameras are decoded by the system
//! `ffmpeg`/`ffprobe` binaries, which must be on `PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod acquire;
pub mod config;
pub mod control;
pub mod document;
pub mod error;
pub mod frame;
pub mod gif;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use acquire::{BatchProducer, FiniteSource, Recorder, RecorderState, ToggledLiveSource};
pub use config::{
    CaptureConfig, CaptureConfigBuilder, FlipbookConfig, FlipbookConfigBuilder,
    LayoutParameters, LayoutParametersBuilder, PaperSize,
};
pub use control::{ChannelControl, ControlInput, ControlSignal};
pub use document::{DocumentSink, FlipbookDocument, PageElement, PageFit};
pub use error::FlipbookError;
pub use frame::{square_crop, Frame, FrameBatch};
pub use job::{run_camera, run_live, run_video, LiveRecording};
pub use output::RenderStats;
pub use progress::{FlipbookProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::{render, render_document, render_with_sink};
pub use source::FrameSource;
