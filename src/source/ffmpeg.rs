//! Video files and live cameras through the system `ffmpeg` binary.
//!
//! The source runs `ffprobe` once to learn the frame size, then spawns
//! `ffmpeg` decoding the first video stream to raw `rgb24` on stdout and
//! slices that stream into frames of `width * height * 3` bytes. The child
//! process is the device/decoder handle: it is killed and reaped when the
//! source is dropped. ffmpeg's stderr is drained on a helper thread; when
//! stdout ends the exit status decides between a clean end of stream and a
//! [`FlipbookError::FrameReadFailed`] carrying that stderr.

use super::FrameSource;
use crate::error::FlipbookError;
use crate::frame::Frame;
use image::RgbImage;
use serde::Deserialize;
use std::ffi::OsString;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Where ffmpeg reads from: an optional demuxer plus the input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegInput {
    /// Value for `-f` (e.g. `v4l2`); `None` lets ffmpeg guess from the file.
    pub format: Option<&'static str>,
    /// Value for `-framerate`, only meaningful for capture devices.
    pub framerate: Option<u32>,
    /// Value for `-i`.
    pub url: OsString,
}

impl FfmpegInput {
    pub fn file(path: &Path) -> Self {
        Self {
            format: None,
            framerate: None,
            url: path.as_os_str().to_os_string(),
        }
    }

    /// Platform capture device with the given index.
    pub fn camera(device_id: u32, fps: u32) -> Self {
        if cfg!(target_os = "macos") {
            Self {
                format: Some("avfoundation"),
                framerate: None,
                url: device_id.to_string().into(),
            }
        } else if cfg!(target_os = "windows") {
            Self {
                format: Some("vfwcap"),
                framerate: None,
                url: device_id.to_string().into(),
            }
        } else {
            Self {
                format: Some("v4l2"),
                framerate: Some(fps),
                url: format!("/dev/video{device_id}").into(),
            }
        }
    }

    fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if let Some(f) = self.format {
            args.push("-f".into());
            args.push(f.into());
        }
        if let Some(r) = self.framerate {
            args.push("-framerate".into());
            args.push(r.to_string().into());
        }
        args.push("-i".into());
        args.push(self.url.clone());
        args
    }

    fn display(&self) -> String {
        self.url.to_string_lossy().into_owned()
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Frame size of the first video stream of `input`.
pub fn probe_dimensions(input: &FfmpegInput) -> Result<(u32, u32), FlipbookError> {
    #[derive(Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let unavailable = |reason: String| FlipbookError::SourceUnavailable {
        source_id: input.display(),
        reason,
    };

    let mut cmd = Command::new("ffprobe");
    cmd.args(["-v", "error", "-print_format", "json", "-show_streams"]);
    if let Some(f) = input.format {
        cmd.args(["-f", f]);
    }
    let out = cmd
        .arg(&input.url)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| unavailable(format!("failed to run ffprobe (is ffmpeg installed?): {e}")))?;
    if !out.status.success() {
        return Err(unavailable(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| unavailable(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| unavailable("no video stream found".into()))?;
    match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(unavailable("video stream has no frame size".into())),
    }
}

/// A running ffmpeg decode of one input.
pub struct FfmpegSource {
    id: String,
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    read: usize,
    exhausted: bool,
}

impl FfmpegSource {
    /// Decode an existing video file.
    pub fn open_file(path: &Path) -> Result<Self, FlipbookError> {
        if !path.exists() {
            return Err(FlipbookError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::open(FfmpegInput::file(path))
    }

    /// Capture from the camera with index `device_id`.
    pub fn open_camera(device_id: u32, fps: u32) -> Result<Self, FlipbookError> {
        Self::open(FfmpegInput::camera(device_id, fps))
    }

    pub fn open(input: FfmpegInput) -> Result<Self, FlipbookError> {
        let (width, height) = probe_dimensions(&input)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-nostdin", "-noautorotate"])
            .args(input.args())
            .args([
                "-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| FlipbookError::SourceUnavailable {
            source_id: input.display(),
            reason: format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"),
        })?;
        let source = Self::from_child(input.display(), child, width, height)?;
        info!(
            "Opened '{}' via ffmpeg: {}x{}",
            source.id, width, height
        );
        Ok(source)
    }

    /// Wrap a spawned decoder that writes `rgb24` frames of `width` x
    /// `height` on stdout.
    fn from_child(
        id: String,
        mut child: Child,
        width: u32,
        height: u32,
    ) -> Result<Self, FlipbookError> {
        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(FlipbookError::Internal(
                "failed to open ffmpeg stdout/stderr".into(),
            ));
        };
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            id,
            child,
            stdout: BufReader::new(stdout),
            width,
            height,
            stderr_drain: Some(stderr_drain),
            read: 0,
            exhausted: false,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Stdout is closed: reap the decoder and turn a failed exit into an error.
    fn finish(&mut self) -> Result<Option<Frame>, FlipbookError> {
        let (source_id, frame) = (self.id.clone(), self.read + 1);
        let failed = |detail: String| FlipbookError::FrameReadFailed {
            source_id: source_id.clone(),
            frame,
            detail,
        };
        let status = self
            .child
            .wait()
            .map_err(|e| failed(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(Err(e)) => format!("<stderr unreadable: {e}>"),
                Err(_) => "<stderr drain panicked>".to_string(),
            },
            None => String::new(),
        };
        end_of_stream(status, &stderr).map_err(failed)?;
        debug!("'{}' ended after {} frames", self.id, self.read);
        Ok(None)
    }
}

/// A decoder that exited successfully ended its stream; anything else is a
/// failure described by its status and stderr.
fn end_of_stream(status: ExitStatus, stderr: &str) -> Result<(), String> {
    if status.success() {
        return Ok(());
    }
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(format!("ffmpeg exited with {status}"))
    } else {
        Err(format!("ffmpeg exited with {status}: {stderr}"))
    }
}

impl FrameSource for FfmpegSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_next(&mut self) -> Result<Option<Frame>, FlipbookError> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.frame_len()];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                // A trailing partial frame is dropped with the stream end.
                self.exhausted = true;
                return self.finish();
            }
            Err(e) => {
                self.exhausted = true;
                return Err(FlipbookError::FrameReadFailed {
                    source_id: self.id.clone(),
                    frame: self.read + 1,
                    detail: e.to_string(),
                });
            }
        }
        self.read += 1;
        RgbImage::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| FlipbookError::Internal("raw frame buffer size mismatch".into()))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                warn!("Failed to stop ffmpeg for '{}': {}", self.id, e);
            }
        }
        let _ = self.child.wait();
        debug!("Released '{}'", self.id);
    }
}
