//! Flipbook jobs: drive a [`BatchProducer`] and render every batch it yields.
//!
//! Each batch is fully rendered (and, for live recordings, saved as a GIF)
//! before the producer is asked for the next one. Capture never runs while a
//! document is being written. The flipbook is the primary artefact: it is
//! written first, and a GIF that cannot be saved is logged and skipped.

use crate::acquire::{BatchProducer, FiniteSource, ToggledLiveSource};
use crate::config::FlipbookConfig;
use crate::control::ControlInput;
use crate::error::FlipbookError;
use crate::frame::FrameBatch;
use crate::gif::write_gif;
use crate::output::{flipbook_path_for_video, unique_recording_paths, RecordingPaths, RenderStats};
use crate::document::docx::DocxSink;
use crate::render::{render_batch, render_with_sink};
use crate::source::ffmpeg::FfmpegSource;
use crate::source::FrameSource;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Artefacts of one completed live recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveRecording {
    /// The rendered flipbook.
    pub stats: RenderStats,
    /// The GIF sidecar, when one was written.
    pub gif_path: Option<PathBuf>,
}

/// Pull batches from `producer` until it ends, handing each to `on_batch`.
///
/// Returns the number of batches handled. The first error from either side
/// stops the job.
pub fn drive<P, F>(producer: &mut P, mut on_batch: F) -> Result<usize, FlipbookError>
where
    P: BatchProducer + ?Sized,
    F: FnMut(FrameBatch) -> Result<(), FlipbookError>,
{
    let mut handled = 0;
    while let Some(batch) = producer.produce_next_batch()? {
        on_batch(batch)?;
        handled += 1;
    }
    Ok(handled)
}

/// Turn a pre-existing video or GIF into a flipbook.
///
/// The document is written to `output`, or next to the video as
/// `<stem>_flipbook.docx` when `output` is `None`.
pub fn run_video(
    video: &Path,
    config: &FlipbookConfig,
    output: Option<&Path>,
) -> Result<RenderStats, FlipbookError> {
    let start = Instant::now();
    info!("Starting flipbook from '{}'", video.display());

    let dest = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| flipbook_path_for_video(video));

    let mut producer = FiniteSource::open(video)?;
    let mut stats = None;
    drive(&mut producer, |batch| {
        stats = Some(render_batch(batch, config, &dest)?);
        Ok(())
    })?;

    let stats = stats.ok_or_else(|| {
        FlipbookError::Internal(format!("'{}' produced no frame batch", video.display()))
    })?;
    info!(
        "Flipbook from '{}' done in {}ms",
        video.display(),
        start.elapsed().as_millis()
    );
    Ok(stats)
}

/// Run the live loop on `source`, rendering every completed recording into
/// `output_dir` under a timestamped name.
///
/// Returns once `control` terminates or the source ends. A recording still
/// open at that point is discarded.
pub fn run_live<S, C>(
    source: S,
    control: C,
    config: &FlipbookConfig,
    output_dir: &Path,
) -> Result<Vec<LiveRecording>, FlipbookError>
where
    S: FrameSource,
    C: ControlInput,
{
    let mut producer = ToggledLiveSource::new(source, control, config.capture)
        .with_progress(config.progress_callback.clone());
    let mut recordings = Vec::new();

    drive(&mut producer, |batch| {
        let paths = unique_recording_paths(output_dir, &chrono::Local::now());
        recordings.push(save_recording(batch, config, paths)?);
        Ok(())
    })?;

    info!("Live session ended: {} flipbooks", recordings.len());
    Ok(recordings)
}

/// Render one finished recording to `paths.flipbook`, then save its GIF.
///
/// A render failure is returned; a GIF failure only leaves `gif_path` empty.
fn save_recording(
    batch: FrameBatch,
    config: &FlipbookConfig,
    paths: RecordingPaths,
) -> Result<LiveRecording, FlipbookError> {
    let stats = render_with_sink(
        batch.frames(),
        &config.layout,
        &paths.flipbook,
        &DocxSink,
        config.progress_callback.as_ref(),
    )?;

    let gif_path = if config.write_gif && !batch.is_empty() {
        match write_gif(batch.frames(), config.capture.fps, &paths.gif) {
            Ok(_) => Some(paths.gif),
            Err(e) => {
                warn!("Flipbook kept, GIF skipped: {}", e);
                None
            }
        }
    } else {
        None
    };
    Ok(LiveRecording { stats, gif_path })
}

/// Open the configured camera and run the live loop on it.
///
/// The camera is released when the loop ends, on every exit path.
pub fn run_camera<C: ControlInput>(
    control: C,
    config: &FlipbookConfig,
    output_dir: &Path,
) -> Result<Vec<LiveRecording>, FlipbookError> {
    let camera = FfmpegSource::open_camera(config.capture.device_id, config.capture.fps)?;
    run_live(camera, control, config, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlSignal;
    use crate::frame::Frame;
    use crate::source::memory::MemorySource;
    use image::Rgb;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct Script(VecDeque<Option<ControlSignal>>);

    impl ControlInput for Script {
        fn poll(&mut self, _timeout: Duration) -> Option<ControlSignal> {
            self.0.pop_front().flatten()
        }
    }

    struct Batches(VecDeque<FrameBatch>);

    impl BatchProducer for Batches {
        fn produce_next_batch(&mut self) -> Result<Option<FrameBatch>, FlipbookError> {
            Ok(self.0.pop_front())
        }
    }

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame::from_pixel(24, 16, Rgb([i as u8 * 30, 90, 200])))
            .collect()
    }

    #[test]
    fn drive_handles_every_batch_in_order() {
        let mut producer = Batches(
            vec![FrameBatch::from(frames(2)), FrameBatch::from(frames(5))].into(),
        );
        let mut seen = Vec::new();
        let n = drive(&mut producer, |b| {
            seen.push(b.len());
            Ok(())
        })
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, vec![2, 5]);
    }

    #[test]
    fn drive_stops_on_first_error() {
        let mut producer = Batches(
            vec![FrameBatch::from(frames(1)), FrameBatch::from(frames(1))].into(),
        );
        let mut calls = 0;
        let err = drive(&mut producer, |_| {
            calls += 1;
            Err(FlipbookError::Internal("boom".into()))
        })
        .unwrap_err();
        assert!(matches!(err, FlipbookError::Internal(_)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn missing_video_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_video(
            &dir.path().join("nope.mp4"),
            &FlipbookConfig::default(),
            None,
        )
        .unwrap_err();
        assert!(err.is_source_unavailable());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn live_session_writes_gif_and_flipbook() {
        use ControlSignal::Toggle;
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new("cam", frames(8));
        let script = Script(
            vec![Some(Toggle), None, Some(Toggle), Some(Toggle), Some(Toggle)].into(),
        );

        let recordings =
            run_live(source, script, &FlipbookConfig::default(), dir.path()).unwrap();
        assert_eq!(recordings.len(), 2);
        assert_eq!(recordings[0].stats.cards, 2);
        assert_eq!(recordings[1].stats.cards, 1);
        assert_ne!(recordings[0].stats.output_path, recordings[1].stats.output_path);
        for r in &recordings {
            assert!(r.stats.output_path.exists());
            assert!(r.gif_path.as_ref().unwrap().exists());
        }
    }

    #[test]
    fn live_session_without_gif() {
        use ControlSignal::{Terminate, Toggle};
        let dir = tempfile::tempdir().unwrap();
        let config = FlipbookConfig::builder().write_gif(false).build().unwrap();
        let script = Script(vec![Some(Toggle), Some(Toggle), Some(Terminate)].into());

        let recordings =
            run_live(MemorySource::new("cam", frames(5)), script, &config, dir.path()).unwrap();
        assert_eq!(recordings.len(), 1);
        assert!(recordings[0].gif_path.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_gif_keeps_flipbook() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();
        let paths = RecordingPaths {
            flipbook: dir.path().join("book_flipbook.docx"),
            gif: blocker.join("book_recording.gif"),
        };

        let rec = save_recording(FrameBatch::from(frames(3)), &FlipbookConfig::default(), paths)
            .unwrap();
        assert!(rec.gif_path.is_none());
        assert_eq!(rec.stats.cards, 3);
        assert!(rec.stats.output_path.exists());
    }

    #[test]
    fn render_failure_writes_no_gif() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();
        let paths = RecordingPaths {
            flipbook: blocker.join("book_flipbook.docx"),
            gif: dir.path().join("book_recording.gif"),
        };

        let err = save_recording(FrameBatch::from(frames(2)), &FlipbookConfig::default(), paths)
            .unwrap_err();
        assert!(err.is_render_failure());
        assert!(!dir.path().join("book_recording.gif").exists());
    }
}
