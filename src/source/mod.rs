//! Upstream side: where per-frame candidates come from
//!
//! Camera capture and decoding live outside this crate. Anything that can
//! hand over one frame's candidates at a time implements [`FrameSource`]:
//! - [`RecordingSource`] replays a recorded candidate stream
//! - [`FrameList`] serves frames from memory
//! - [`FrameQueue`] is the reading end of a producer thread

mod queue;
mod recording;

pub use queue::{FrameQueue, spawn_source};
pub use recording::{RecordingSource, parse_frame_line};

use crate::error::Result;
use crate::models::Candidate;
use std::collections::VecDeque;

/// Supplies one frame of decoder candidates per call
pub trait FrameSource {
    /// Next frame's candidates, or `None` once the stream has ended.
    ///
    /// A frame with nothing decoded is `Some(vec![])`, never skipped.
    fn next_frame(&mut self) -> Result<Option<Vec<Candidate>>>;

    /// Next frame tagged with its index.
    ///
    /// Sources that number their own frames return that number; the rest
    /// take `expected`, the index the consumer is waiting for.
    fn next_indexed(&mut self, expected: u64) -> Result<Option<(u64, Vec<Candidate>)>> {
        Ok(self.next_frame()?.map(|candidates| (expected, candidates)))
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Vec<Candidate>>> {
        (**self).next_frame()
    }

    fn next_indexed(&mut self, expected: u64) -> Result<Option<(u64, Vec<Candidate>)>> {
        (**self).next_indexed(expected)
    }
}

/// In-memory frame sequence
#[derive(Debug, Clone, Default)]
pub struct FrameList {
    frames: VecDeque<Vec<Candidate>>,
}

impl FrameList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame
    pub fn push(&mut self, candidates: Vec<Candidate>) {
        self.frames.push_back(candidates);
    }

    /// Frames not yet handed out
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when every frame has been handed out
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl From<Vec<Vec<Candidate>>> for FrameList {
    fn from(frames: Vec<Vec<Candidate>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for FrameList {
    fn next_frame(&mut self) -> Result<Option<Vec<Candidate>>> {
        Ok(self.frames.pop_front())
    }
}
