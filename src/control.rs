//! User control of the live-capture loop.
//!
//! The loop blocks on [`ControlInput::poll`] once per frame with a timeout of
//! one frame interval; that wait is what paces capture. Signals come from a
//! channel so any producer (a stdin reader, a Ctrl+C handler, a test) can
//! feed them.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::debug;

/// A user command to the live-capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Start a recording when idle, stop and render it when recording.
    Toggle,
    /// Leave the loop; an open recording is discarded.
    Terminate,
}

/// Source of control signals.
pub trait ControlInput {
    /// Wait up to `timeout` for the next signal.
    fn poll(&mut self, timeout: Duration) -> Option<ControlSignal>;
}

/// Control input backed by an mpsc channel.
pub struct ChannelControl {
    rx: Receiver<ControlSignal>,
}

impl ChannelControl {
    /// A control input and the sender that feeds it.
    pub fn new() -> (Self, Sender<ControlSignal>) {
        let (tx, rx) = mpsc::channel();
        (Self { rx }, tx)
    }
}

impl ControlInput for ChannelControl {
    fn poll(&mut self, timeout: Duration) -> Option<ControlSignal> {
        match self.rx.recv_timeout(timeout) {
            Ok(signal) => Some(signal),
            Err(RecvTimeoutError::Timeout) => None,
            // Nobody can toggle any more.
            Err(RecvTimeoutError::Disconnected) => Some(ControlSignal::Terminate),
        }
    }
}

/// Map one line of terminal input to a signal.
///
/// An empty line (just Enter), `space` or `s` toggles; `q`, `quit`, `exit`
/// and `esc` terminate. Anything else is ignored.
pub fn parse_command(line: &str) -> Option<ControlSignal> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "space" | "s" => Some(ControlSignal::Toggle),
        "q" | "quit" | "exit" | "esc" => Some(ControlSignal::Terminate),
        _ => None,
    }
}

/// Forward commands read line by line from `reader` into `tx`.
///
/// Returns when the reader is exhausted, when a terminate command was sent,
/// or when the receiving side is gone. End of input counts as terminate.
pub fn forward_commands<R: BufRead>(reader: R, tx: &Sender<ControlSignal>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if let Some(signal) = parse_command(&line) {
            debug!("control: {:?}", signal);
            if tx.send(signal).is_err() || signal == ControlSignal::Terminate {
                return;
            }
        }
    }
    let _ = tx.send(ControlSignal::Terminate);
}

/// Read commands from stdin on a helper thread.
///
/// The thread only moves lines into the channel; all capture and rendering
/// stay on the caller's thread.
pub fn spawn_stdin_reader(tx: Sender<ControlSignal>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("flipbook-stdin".into())
        .spawn(move || forward_commands(std::io::stdin().lock(), &tx))
        .map(|_| ())
}
