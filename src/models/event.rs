use super::Candidate;
use chrono::{DateTime, Utc};

/// A confirmed candidate as handed to sinks.
///
/// The engine only reports which candidates were confirmed; the session
/// attaches the sequence number and wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    /// 1-based count of confirmations in the session
    pub sequence: u64,
    /// Frame at which the candidate was confirmed
    pub frame_index: u64,
    /// Wall-clock time of confirmation
    pub timestamp: DateTime<Utc>,
    /// The confirmed value
    pub candidate: Candidate,
}

impl ScanEvent {
    /// Build an event stamped with the current time
    pub fn now(sequence: u64, frame_index: u64, candidate: Candidate) -> Self {
        Self {
            sequence,
            frame_index,
            timestamp: Utc::now(),
            candidate,
        }
    }

    /// Timestamp as fractional Unix seconds
    pub fn unix_seconds(&self) -> f64 {
        self.timestamp.timestamp() as f64
            + f64::from(self.timestamp.timestamp_subsec_micros()) / 1_000_000.0
    }
}
