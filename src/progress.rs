//! Progress-callback trait for capture and render events.
//!
//! Inject an [`Arc<dyn FlipbookProgressCallback>`] via
//! [`crate::config::FlipbookConfigBuilder::progress_callback`] to receive
//! events while frames are recorded and cards are rendered.
//!
//! # Example
//!
//! ```rust
//! use flipbook_printer::{FlipbookConfig, FlipbookProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     cards: AtomicUsize,
//! }
//!
//! impl FlipbookProgressCallback for CountingCallback {
//!     fn on_card_rendered(&self, number: usize, total: usize) {
//!         self.cards.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("card {number}/{total}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { cards: AtomicUsize::new(0) });
//!
//! let config = FlipbookConfig::builder()
//!     .progress_callback(counter as Arc<dyn FlipbookProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the acquisition loop and the renderer as a job advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Everything runs on the caller's thread; the
/// `Send + Sync` bound only lets the callback be shared with other parts of
/// the host application.
pub trait FlipbookProgressCallback: Send + Sync {
    /// A live recording was started by a toggle.
    fn on_recording_started(&self) {}

    /// A frame was appended to the open recording.
    ///
    /// # Arguments
    /// * `frames`: number of frames in the recording so far
    fn on_frame_captured(&self, frames: usize) {
        let _ = frames;
    }

    /// A live recording was stopped by a toggle and will be rendered.
    fn on_recording_stopped(&self, frames: usize) {
        let _ = frames;
    }

    /// The loop was terminated while recording; the frames are dropped.
    fn on_recording_aborted(&self, frames: usize) {
        let _ = frames;
    }

    /// Called once before the first card of a batch is prepared.
    fn on_render_start(&self, total_frames: usize) {
        let _ = total_frames;
    }

    /// A card was bordered, numbered and encoded.
    ///
    /// # Arguments
    /// * `number`: 1-based card number
    /// * `total`: cards in this batch
    fn on_card_rendered(&self, number: usize, total: usize) {
        let _ = (number, total);
    }

    /// The document was saved to `path`.
    fn on_render_complete(&self, path: &Path, cards: usize) {
        let _ = (path, cards);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl FlipbookProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::FlipbookConfig`].
pub type ProgressCallback = Arc<dyn FlipbookProgressCallback>;
