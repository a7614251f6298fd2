//! Frame acquisition: deciding which frames form one flipbook batch.
//!
//! Both acquisition modes implement [`BatchProducer`]:
//!
//! * [`FiniteSource`] reads a pre-existing video to the end and yields it as
//!   a single batch. No cropping.
//! * [`ToggledLiveSource`] runs the live loop. A [`Recorder`] tracks whether a
//!   recording is open; a toggle opens one, the next toggle closes it and
//!   hands the batch out, terminate ends the loop and throws away anything
//!   still recording.
//!
//! The caller renders each batch before asking for the next one, so live
//! recordings are strictly serialized.

use crate::config::CaptureConfig;
use crate::control::{ControlInput, ControlSignal};
use crate::error::FlipbookError;
use crate::frame::{square_crop, Frame, FrameBatch};
use crate::progress::ProgressCallback;
use crate::source::{self, FrameSource};
use std::path::Path;
use tracing::{debug, info, warn};

/// Produces the batches of one flipbook job.
pub trait BatchProducer {
    /// The next finished batch, or `Ok(None)` when the job has ended.
    fn produce_next_batch(&mut self) -> Result<Option<FrameBatch>, FlipbookError>;
}

// ── Recorder state machine ───────────────────────────────────────────────

/// Where the live loop stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderState {
    /// No recording open; captured frames are only shown, not kept.
    Idle,
    /// A recording is open and every captured frame is appended.
    Recording(FrameBatch),
    /// The loop was terminated; no further transitions.
    Finished,
}

/// Outcome of feeding a signal to the [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Idle → Recording with a new empty batch.
    Started,
    /// Recording → Idle; the frozen batch is ready to render.
    Completed(FrameBatch),
    /// Idle or Recording → Finished. `discarded` is the number of frames
    /// thrown away when the loop ended mid-recording.
    Terminated { discarded: Option<usize> },
    /// The signal has no effect in the current state.
    Ignored,
}

/// Explicit Idle/Recording state machine of the live loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorder {
    state: RecorderState,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
        }
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RecorderState::Finished)
    }

    /// Frames in the open recording, if any.
    pub fn recorded(&self) -> Option<usize> {
        match &self.state {
            RecorderState::Recording(batch) => Some(batch.len()),
            _ => None,
        }
    }

    /// Offer a captured frame. Kept only while recording; returns the
    /// recording length after the append.
    pub fn capture(&mut self, frame: Frame) -> Option<usize> {
        match &mut self.state {
            RecorderState::Recording(batch) => {
                batch.push(frame);
                Some(batch.len())
            }
            _ => None,
        }
    }

    /// Apply a control signal.
    pub fn apply(&mut self, signal: ControlSignal) -> Transition {
        match signal {
            ControlSignal::Toggle => self.toggle(),
            ControlSignal::Terminate => self.terminate(),
        }
    }

    pub fn toggle(&mut self) -> Transition {
        match std::mem::replace(&mut self.state, RecorderState::Finished) {
            RecorderState::Idle => {
                self.state = RecorderState::Recording(FrameBatch::new());
                Transition::Started
            }
            RecorderState::Recording(batch) => {
                self.state = RecorderState::Idle;
                Transition::Completed(batch)
            }
            RecorderState::Finished => Transition::Ignored,
        }
    }

    pub fn terminate(&mut self) -> Transition {
        match std::mem::replace(&mut self.state, RecorderState::Finished) {
            RecorderState::Idle => Transition::Terminated { discarded: None },
            RecorderState::Recording(batch) => Transition::Terminated {
                discarded: Some(batch.len()),
            },
            RecorderState::Finished => Transition::Ignored,
        }
    }
}

// ── Finite source ────────────────────────────────────────────────────────

/// A pre-existing video read start to end into exactly one batch.
pub struct FiniteSource<S> {
    source: Option<S>,
}

impl<S: FrameSource> FiniteSource<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Some(source),
        }
    }
}

impl FiniteSource<Box<dyn FrameSource>> {
    /// Open a video or GIF file.
    pub fn open(path: &Path) -> Result<Self, FlipbookError> {
        source::open_video(path).map(Self::new)
    }
}

impl<S: FrameSource> BatchProducer for FiniteSource<S> {
    fn produce_next_batch(&mut self) -> Result<Option<FrameBatch>, FlipbookError> {
        // Taking the source releases it when this call returns.
        let Some(mut source) = self.source.take() else {
            return Ok(None);
        };

        let mut batch = FrameBatch::new();
        while let Some(frame) = source.read_next()? {
            batch.push(frame);
        }

        if batch.is_empty() {
            warn!("'{}' contained no frames", source.id());
        } else {
            info!("Read {} frames from '{}'", batch.len(), source.id());
        }
        Ok(Some(batch))
    }
}

// ── Live source ──────────────────────────────────────────────────────────

/// The live-capture loop: toggle to start, toggle to stop, terminate to quit.
pub struct ToggledLiveSource<S, C> {
    source: Option<S>,
    control: C,
    recorder: Recorder,
    capture: CaptureConfig,
    progress: Option<ProgressCallback>,
}

impl<S: FrameSource, C: ControlInput> ToggledLiveSource<S, C> {
    pub fn new(source: S, control: C, capture: CaptureConfig) -> Self {
        Self {
            source: Some(source),
            control,
            recorder: Recorder::new(),
            capture,
            progress: None,
        }
    }

    pub fn with_progress(mut self, cb: Option<ProgressCallback>) -> Self {
        self.progress = cb;
        self
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// End the loop, dropping any open recording and releasing the source.
    fn finish(&mut self, reason: &str) {
        if let Transition::Terminated {
            discarded: Some(n),
        } = self.recorder.terminate()
        {
            info!("Recording aborted ({reason}); {n} frames discarded");
            if let Some(ref cb) = self.progress {
                cb.on_recording_aborted(n);
            }
        } else {
            info!("Capture loop ended ({reason})");
        }
        self.source = None;
    }
}

impl<S: FrameSource, C: ControlInput> BatchProducer for ToggledLiveSource<S, C> {
    fn produce_next_batch(&mut self) -> Result<Option<FrameBatch>, FlipbookError> {
        let interval = self.capture.frame_interval();

        loop {
            let Some(source) = self.source.as_mut() else {
                return Ok(None);
            };
            let Some(frame) = source.read_next()? else {
                self.finish("source ended");
                return Ok(None);
            };

            let frame = if self.capture.square {
                square_crop(frame)
            } else {
                frame
            };

            if let Some(n) = self.recorder.capture(frame) {
                debug!("Recorded frame {}", n);
                if let Some(ref cb) = self.progress {
                    cb.on_frame_captured(n);
                }
            }

            let Some(signal) = self.control.poll(interval) else {
                continue;
            };
            match signal {
                ControlSignal::Terminate => {
                    self.finish("terminated");
                    return Ok(None);
                }
                ControlSignal::Toggle => match self.recorder.toggle() {
                    Transition::Started => {
                        info!("Started recording");
                        if let Some(ref cb) = self.progress {
                            cb.on_recording_started();
                        }
                    }
                    Transition::Completed(batch) => {
                        info!("Stopped recording: {} frames", batch.len());
                        if let Some(ref cb) = self.progress {
                            cb.on_recording_stopped(batch.len());
                        }
                        return Ok(Some(batch));
                    }
                    Transition::Terminated { .. } | Transition::Ignored => {}
                },
            }
        }
    }
}
