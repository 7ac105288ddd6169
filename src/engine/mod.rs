//! Scan confirmation and holdoff engine
//!
//! Turns the per-frame candidate stream of a decoder into confirmed scans:
//! - A candidate is confirmed once it is seen in `required_scans` distinct
//!   frames inside a sliding window of `scan_window` frames
//! - A confirmed candidate is then held off until it has been absent for
//!   `holdoff_window` frames, so a barcode held in front of the camera
//!   fires once
//!
//! Each call to [`ConfirmationEngine::process_frame`] runs five phases in
//! order: holdoff refresh, ingestion, pending eviction, confirmation and
//! holdoff expiry.

mod holdoff;
mod pending;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::Candidate;
use holdoff::HoldoffSet;
use pending::PendingBuffer;
use std::collections::HashSet;
use tracing::debug;

/// Where a candidate sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    /// Not tracked
    Unseen,
    /// Accumulating readings toward confirmation
    Pending,
    /// Confirmed and suppressed
    HeldOff,
}

/// Sliding-window confirmation filter with holdoff.
///
/// One instance per frame stream; instances share nothing. Not safe for
/// concurrent calls: drive it from a single loop.
///
/// # Example
/// ```
/// use rust_scan::{Candidate, ConfirmationEngine, EngineConfig, Symbology};
///
/// let mut engine = ConfirmationEngine::new(EngineConfig::new(2, 5, 20)).unwrap();
/// let code = Candidate::new("4006381333931", Symbology::Ean13);
/// assert!(engine.process_frame(0, [code.clone()]).unwrap().is_empty());
/// assert_eq!(engine.process_frame(1, [code.clone()]).unwrap(), vec![code]);
/// ```
#[derive(Debug)]
pub struct ConfirmationEngine {
    config: EngineConfig,
    next_frame: u64,
    pending: PendingBuffer,
    holdoff: HoldoffSet,
}

impl ConfirmationEngine {
    /// Create an engine with empty buffers
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            next_frame: config.start_frame,
            pending: PendingBuffer::new(),
            holdoff: HoldoffSet::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frame index the next call must supply
    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    /// Process one frame of candidates and return the ones confirmed by it.
    ///
    /// `frame_index` must be exactly the value of [`next_frame`](Self::next_frame);
    /// otherwise [`Error::OutOfOrderFrame`] is returned and no state changes.
    /// Frame `u64::MAX` has no successor and fails with
    /// [`Error::FrameClockExhausted`], also without touching state.
    /// Duplicate candidates within a frame count as one sighting.
    /// Frames with no candidates still advance eviction and holdoff expiry.
    pub fn process_frame<I>(&mut self, frame_index: u64, candidates: I) -> Result<Vec<Candidate>>
    where
        I: IntoIterator<Item = Candidate>,
    {
        if frame_index != self.next_frame {
            return Err(Error::OutOfOrderFrame {
                expected: self.next_frame,
                got: frame_index,
            });
        }
        let following = frame_index
            .checked_add(1)
            .ok_or(Error::FrameClockExhausted { frame: frame_index })?;

        // Holdoff refresh, then ingestion of whatever is left
        let mut seen = HashSet::new();
        for candidate in candidates {
            if !seen.insert(candidate.clone()) {
                continue;
            }
            if self.holdoff.touch(&candidate, frame_index) {
                debug!(frame = frame_index, candidate = %candidate, "held off");
                continue;
            }
            self.pending.record(&candidate, frame_index);
        }

        // Keep readings in [frame - scan_window + 1, frame]
        let oldest = following.saturating_sub(self.config.scan_window);
        self.pending.evict_before(frame_index, oldest);

        let required = self.config.required_scans as usize;
        let mut confirmed = Vec::new();
        for (candidate, last_reading) in self.pending.take_confirmed(required) {
            debug!(frame = frame_index, candidate = %candidate, "confirmed");
            self.holdoff.insert(candidate.clone(), last_reading);
            confirmed.push(candidate);
        }

        self.holdoff.expire(frame_index, self.config.holdoff_window);

        self.next_frame = following;
        Ok(confirmed)
    }

    /// Process candidates as the next expected frame
    pub fn advance<I>(&mut self, candidates: I) -> Result<Vec<Candidate>>
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.process_frame(self.next_frame, candidates)
    }

    /// Readings currently held for a pending candidate
    pub fn pending_readings(&self, candidate: &Candidate) -> Option<&[u64]> {
        self.pending.readings(candidate)
    }

    /// Last sighting of a held-off candidate
    pub fn holdoff_last_seen(&self, candidate: &Candidate) -> Option<u64> {
        self.holdoff.last_seen(candidate)
    }

    /// Number of pending candidates
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of held-off candidates
    pub fn holdoff_len(&self) -> usize {
        self.holdoff.len()
    }

    /// Lifecycle state of a candidate
    pub fn state_of(&self, candidate: &Candidate) -> CandidateState {
        if self.holdoff.last_seen(candidate).is_some() {
            CandidateState::HeldOff
        } else if self.pending.contains(candidate) {
            CandidateState::Pending
        } else {
            CandidateState::Unseen
        }
    }

    /// Forget all candidates and rewind the frame clock to the start frame
    pub fn reset(&mut self) {
        self.pending.clear();
        self.holdoff.clear();
        self.next_frame = self.config.start_frame;
    }
}
