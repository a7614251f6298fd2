//! Frames that are already in memory.

use super::FrameSource;
use crate::error::FlipbookError;
use crate::frame::Frame;
use std::collections::VecDeque;

/// Yields a fixed list of frames in order, then end of stream.
#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    frames: VecDeque<Frame>,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            id: id.into(),
            frames: frames.into(),
        }
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_next(&mut self) -> Result<Option<Frame>, FlipbookError> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn yields_in_order_then_ends() {
        let frames: Vec<Frame> = (0..3u8)
            .map(|i| Frame::from_pixel(1, 1, Rgb([i, 0, 0])))
            .collect();
        let mut src = MemorySource::new("mem", frames);
        assert_eq!(src.remaining(), 3);
        for i in 0..3u8 {
            assert_eq!(src.read_next().unwrap().unwrap().get_pixel(0, 0)[0], i);
        }
        assert!(src.read_next().unwrap().is_none());
        assert!(src.read_next().unwrap().is_none());
    }
}
