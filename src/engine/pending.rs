//! Pending buffer: per-candidate sightings that have not reached threshold yet

use crate::models::Candidate;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
struct PendingEntry {
    /// Insertion sequence, breaks ties between candidates confirmed together
    seq: u64,
    /// Frame indices, strictly increasing
    readings: Vec<u64>,
}

/// Candidate -> frame indices at which it was seen, in insertion order
#[derive(Debug, Default)]
pub(crate) struct PendingBuffer {
    entries: HashMap<Candidate, PendingEntry>,
    next_seq: u64,
}

impl PendingBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn readings(&self, candidate: &Candidate) -> Option<&[u64]> {
        self.entries.get(candidate).map(|e| e.readings.as_slice())
    }

    pub(crate) fn contains(&self, candidate: &Candidate) -> bool {
        self.entries.contains_key(candidate)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_seq = 0;
    }

    /// Append `frame` to the candidate's readings, creating the entry if needed
    pub(crate) fn record(&mut self, candidate: &Candidate, frame: u64) {
        if !self.entries.contains_key(candidate) {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.entries.insert(
                candidate.clone(),
                PendingEntry {
                    seq,
                    readings: Vec::new(),
                },
            );
        }
        let Some(entry) = self.entries.get_mut(candidate) else {
            return;
        };
        if entry.readings.last() != Some(&frame) {
            entry.readings.push(frame);
        }
        debug!(frame, candidate = %candidate, readings = ?entry.readings, "add");
    }

    /// Drop readings older than `oldest` and delete entries left empty.
    ///
    /// Returns the deleted candidates.
    pub(crate) fn evict_before(&mut self, frame: u64, oldest: u64) -> Vec<Candidate> {
        let mut emptied = Vec::new();
        for (candidate, entry) in self.entries.iter_mut() {
            let before = entry.readings.len();
            entry.readings.retain(|&reading| reading >= oldest);
            if entry.readings.len() != before {
                debug!(
                    frame,
                    candidate = %candidate,
                    dropped = before - entry.readings.len(),
                    "drop stale readings"
                );
            }
            if entry.readings.is_empty() {
                emptied.push(candidate.clone());
            }
        }
        for candidate in &emptied {
            debug!(frame, candidate = %candidate, "delete pending entry");
            self.entries.remove(candidate);
        }
        emptied
    }

    /// Remove every entry with at least `required` readings.
    ///
    /// Returned in insertion order, each paired with its last reading.
    pub(crate) fn take_confirmed(&mut self, required: usize) -> Vec<(Candidate, u64)> {
        let mut ready: Vec<(u64, Candidate)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.readings.len() >= required)
            .map(|(candidate, entry)| (entry.seq, candidate.clone()))
            .collect();
        ready.sort_by_key(|(seq, _)| *seq);

        let mut confirmed = Vec::with_capacity(ready.len());
        for (_, candidate) in ready {
            if let Some(entry) = self.entries.remove(&candidate) {
                if let Some(&last) = entry.readings.last() {
                    confirmed.push((candidate, last));
                }
            }
        }
        confirmed
    }
}
