//! CLI binary for flipbook-printer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `FlipbookConfig`, wires terminal and Ctrl+C control into the live
//! loop, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use flipbook_printer::control::spawn_stdin_reader;
use flipbook_printer::{
    run_camera, run_video, CaptureConfig, ChannelControl, ControlSignal, FlipbookConfig,
    FlipbookProgressCallback, LayoutParameters, LiveRecording, PaperSize, ProgressCallback,
    RenderStats,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

const IDLE_HINT: &str = "Enter: start recording   q: quit";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while idle or recording, a bar while cards
/// are rendered.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Return to the idle spinner after each render (camera mode).
    live: bool,
}

impl CliProgressCallback {
    fn new(live: bool, prefix: &str, message: &str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let cb = Self { bar, live };
        cb.spinner(prefix, message);
        cb.bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(cb)
    }

    fn spinner(&self, prefix: &str, message: &str) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        self.bar.set_style(style);
        self.bar.set_prefix(prefix.to_string());
        self.bar.set_message(message.to_string());
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} cards  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_elapsed();
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl FlipbookProgressCallback for CliProgressCallback {
    fn on_recording_started(&self) {
        self.spinner("Recording", "0 frames   Enter: stop");
    }

    fn on_frame_captured(&self, frames: usize) {
        self.bar.set_message(format!("{frames} frames   Enter: stop"));
    }

    fn on_recording_stopped(&self, frames: usize) {
        self.bar.println(format!(
            "{} Recorded {} frames",
            green("●"),
            bold(&frames.to_string())
        ));
    }

    fn on_recording_aborted(&self, frames: usize) {
        self.bar.println(format!(
            "{} Recording discarded ({} frames)",
            red("✗"),
            frames
        ));
    }

    fn on_render_start(&self, total_frames: usize) {
        self.activate_bar(total_frames);
    }

    fn on_card_rendered(&self, _number: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_render_complete(&self, path: &Path, cards: usize) {
        self.bar.println(format!(
            "{} {} cards  →  {}",
            green("✔"),
            cards,
            bold(&path.display().to_string())
        ));
        if self.live {
            self.spinner("Idle", IDLE_HINT);
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Record from camera 0, square frames, 10 fps
  flipbook -d 0 --square --fps 10

  # Convert an existing video (writes jump_flipbook.docx next to it)
  flipbook -f jump.mp4

  # Taller cards on US Letter, narrow printer margins
  flipbook -f cat.gif --height 5 --paper letter --sheet-margin 0.8

  # Machine-readable statistics
  flipbook -f jump.mp4 --json > stats.json

CAMERA CONTROLS (type into the terminal):
  Enter / space   start or stop a recording
  q / esc         quit (an unfinished recording is discarded)
  Ctrl+C          quit

OUTPUT:
  Video mode   <video name>_flipbook.docx next to the video, or --output
  Camera mode  <YYYYmmddHHMMSS>_flipbook.docx and _recording.gif per
               recording, in --output-dir

REQUIREMENTS:
  Cameras and video files other than GIF are read through ffmpeg/ffprobe,
  which must be on PATH. GIF files are decoded without ffmpeg.
"#;

/// Turn camera recordings, videos and GIFs into printable flipbooks.
#[derive(Parser, Debug)]
#[command(
    name = "flipbook",
    version,
    about = "Turn camera recordings, videos and GIFs into printable flipbooks",
    long_about = "Record a short clip from a camera (or take an existing video or GIF) and \
lay out every frame as a numbered, bordered card in a .docx ready to print, cut and bind.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Existing video or GIF to convert. Without it the camera is used.
    #[arg(short = 'f', long, env = "FLIPBOOK_FILEPATH_VIDEO")]
    filepath_video: Option<PathBuf>,

    /// Camera index.
    #[arg(short, long, env = "FLIPBOOK_DEVICE_ID", default_value_t = 1)]
    device_id: u32,

    /// Recording frame rate (camera mode).
    #[arg(long, env = "FLIPBOOK_FPS", default_value_t = 15,
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,

    /// Crop camera frames to a centred square (cropped, never resized).
    #[arg(long, env = "FLIPBOOK_SQUARE")]
    square: bool,

    /// Printed card height in cm.
    #[arg(long, env = "FLIPBOOK_HEIGHT", default_value_t = 3.5)]
    height: f64,

    /// Binding margin left of every card in cm.
    #[arg(long, env = "FLIPBOOK_LEFT_MARGIN", default_value_t = 2.5)]
    left_margin: f64,

    /// Cut-guide line width in pixels (currently always drawn at 1 px).
    #[arg(long, env = "FLIPBOOK_BORDER_LINEWIDTH", default_value_t = 1)]
    border_linewidth: u32,

    /// Sheet margin on all four sides in cm. Pick what your printer can do.
    #[arg(long, env = "FLIPBOOK_SHEET_MARGIN", default_value_t = 1.27)]
    sheet_margin: f64,

    /// Paper size.
    #[arg(long, env = "FLIPBOOK_PAPER", value_enum, default_value = "a4")]
    paper: PaperArg,

    /// Document path in video mode (default: next to the video).
    #[arg(short, long, env = "FLIPBOOK_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for camera-mode flipbooks and GIFs.
    #[arg(long, env = "FLIPBOOK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Do not save a GIF of each camera recording.
    #[arg(long, env = "FLIPBOOK_NO_GIF")]
    no_gif: bool,

    /// Print render statistics as JSON on stdout.
    #[arg(long, env = "FLIPBOOK_JSON")]
    json: bool,

    /// Disable progress display.
    #[arg(long, env = "FLIPBOOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLIPBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLIPBOOK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PaperArg {
    A4,
    Letter,
}

impl From<PaperArg> for PaperSize {
    fn from(v: PaperArg) -> Self {
        match v {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::Letter => PaperSize::Letter,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are hidden behind the progress display.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(if cli.filepath_video.is_some() {
            CliProgressCallback::new(false, "Reading", "decoding frames…")
        } else {
            CliProgressCallback::new(true, "Idle", IDLE_HINT)
        })
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn FlipbookProgressCallback>),
    )?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match cli.filepath_video {
        Some(ref video) => run_video_mode(&cli, video, &config),
        None => run_camera_mode(&cli, &config),
    };
    if let Some(cb) = progress {
        cb.finish();
    }
    result
}

fn run_video_mode(cli: &Cli, video: &Path, config: &FlipbookConfig) -> Result<()> {
    let stats = run_video(video, config, cli.output.as_deref())
        .with_context(|| format!("Cannot make a flipbook from '{}'", video.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        print_summary(&stats);
    }
    Ok(())
}

fn run_camera_mode(cli: &Cli, config: &FlipbookConfig) -> Result<()> {
    let (control, tx) = ChannelControl::new();

    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(ControlSignal::Terminate);
    })
    .context("Failed to install Ctrl+C handler")?;
    spawn_stdin_reader(tx).context("Failed to start terminal input reader")?;

    if !cli.quiet && !cli.json && cli.no_progress {
        eprintln!("{}", dim(IDLE_HINT));
    }

    let recordings: Vec<LiveRecording> = run_camera(control, config, &cli.output_dir)
        .with_context(|| format!("Camera {} failed", cli.device_id))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recordings).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        for r in &recordings {
            print_summary(&r.stats);
            if let Some(ref gif) = r.gif_path {
                eprintln!("   GIF  →  {}", dim(&gif.display().to_string()));
            }
        }
        if recordings.is_empty() {
            eprintln!("No recording was completed.");
        }
    }
    Ok(())
}

fn print_summary(stats: &RenderStats) {
    eprintln!(
        "{}  {} cards  {}ms  →  {}",
        green("✔"),
        stats.cards,
        stats.total_duration_ms,
        bold(&stats.output_path.display().to_string()),
    );
    eprintln!(
        "   {} cards per line  /  ~{} sheets",
        dim(&stats.fit.cards_per_line.to_string()),
        dim(&stats.fit.sheets.to_string()),
    );
}

/// Map CLI args to `FlipbookConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<FlipbookConfig> {
    let layout = LayoutParameters::builder()
        .target_height_cm(cli.height)
        .left_margin_cm(cli.left_margin)
        .border_linewidth_px(cli.border_linewidth)
        .sheet_margin_cm(cli.sheet_margin)
        .paper(cli.paper.into())
        .build()
        .context("Invalid layout")?;

    let capture = CaptureConfig::builder()
        .device_id(cli.device_id)
        .fps(cli.fps)
        .square(cli.square)
        .build()
        .context("Invalid capture settings")?;

    let mut builder = FlipbookConfig::builder()
        .layout(layout)
        .capture(capture)
        .write_gif(!cli.no_gif);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library() {
        let cli = Cli::try_parse_from(["flipbook"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.layout, LayoutParameters::default());
        assert_eq!(config.capture, CaptureConfig::default());
        assert!(config.write_gif);
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "flipbook",
            "-d",
            "0",
            "--fps",
            "10",
            "--square",
            "--height",
            "5",
            "--paper",
            "letter",
            "--no-gif",
        ])
        .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.capture.device_id, 0);
        assert_eq!(config.capture.fps, 10);
        assert!(config.capture.square);
        assert_eq!(config.layout.target_height_cm, 5.0);
        assert_eq!(config.layout.paper, PaperSize::Letter);
        assert!(!config.write_gif);
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Cli::try_parse_from(["flipbook", "--fps", "0"]).is_err());
    }

    #[test]
    fn negative_height_is_rejected() {
        let cli = Cli::try_parse_from(["flipbook", "--height=-1"]).unwrap();
        assert!(build_config(&cli, None).is_err());
    }
}
