//! End-to-end tests through the system ffmpeg.
//!
//! A short clip is synthesised with ffmpeg's `testsrc` generator, decoded
//! back through [`FfmpegSource`] and rendered. Gated behind the
//! `E2E_ENABLED` environment variable and the presence of `ffmpeg` on PATH
//! so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use flipbook_printer::source::ffmpeg::{is_ffmpeg_on_path, FfmpegSource};
use flipbook_printer::{
    run_live, run_video, ControlInput, ControlSignal, FlipbookConfig, FrameSource,
};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Library logs on stderr, visible with `--nocapture`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Skip this test unless E2E_ENABLED is set and ffmpeg is installed.
macro_rules! e2e_skip_unless_ready {
    () => {{
        init_tracing();
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if !is_ffmpeg_on_path() {
            println!("SKIP: ffmpeg not found on PATH");
            return;
        }
    }};
}

/// Encode `frames` frames of 160x120 test pattern at 10 fps into `dir`.
fn make_clip(dir: &Path, frames: u32) -> PathBuf {
    let path = dir.join("clip.mp4");
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i"])
        .arg("testsrc=size=160x120:rate=10")
        .args(["-frames:v", &frames.to_string(), "-pix_fmt", "yuv420p"])
        .arg(&path)
        .status()
        .expect("spawn ffmpeg");
    assert!(status.success(), "ffmpeg failed to synthesise test clip");
    path
}

struct ToggleAt(Vec<usize>, usize);

impl ControlInput for ToggleAt {
    fn poll(&mut self, _timeout: Duration) -> Option<ControlSignal> {
        let i = self.1;
        self.1 += 1;
        self.0.contains(&i).then_some(ControlSignal::Toggle)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_ffmpeg_source_reads_every_frame() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let clip = make_clip(dir.path(), 12);

    let mut source = FfmpegSource::open_file(&clip).unwrap();
    assert_eq!(source.dimensions(), (160, 120));
    let mut n = 0;
    while let Some(frame) = source.read_next().unwrap() {
        assert_eq!(frame.dimensions(), (160, 120));
        n += 1;
    }
    assert_eq!(n, 12);
    assert!(source.read_next().unwrap().is_none());
}

#[test]
fn test_video_to_flipbook() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let clip = make_clip(dir.path(), 8);

    let stats = run_video(&clip, &FlipbookConfig::default(), None).unwrap();
    println!("{}", serde_json::to_string_pretty(&stats).unwrap());
    assert_eq!(stats.cards, 8);
    assert_eq!(stats.output_path, dir.path().join("clip_flipbook.docx"));
    assert!(stats.bytes_written > 0);
}

#[test]
fn test_video_as_live_source() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let clip = make_clip(dir.path(), 10);

    let source = FfmpegSource::open_file(&clip).unwrap();
    let recordings = run_live(
        source,
        ToggleAt(vec![1, 5], 0),
        &FlipbookConfig::default(),
        dir.path(),
    )
    .unwrap();
    assert_eq!(recordings.len(), 1);
    assert_eq!(recordings[0].stats.cards, 4);
    assert!(recordings[0].gif_path.as_ref().unwrap().exists());
}
