//! Holdoff set: confirmed candidates suppressed while they stay in view

use crate::models::Candidate;
use std::collections::HashMap;
use tracing::debug;

/// Candidate -> frame of its most recent sighting under holdoff
#[derive(Debug, Default)]
pub(crate) struct HoldoffSet {
    last_seen: HashMap<Candidate, u64>,
}

impl HoldoffSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub(crate) fn last_seen(&self, candidate: &Candidate) -> Option<u64> {
        self.last_seen.get(candidate).copied()
    }

    pub(crate) fn clear(&mut self) {
        self.last_seen.clear();
    }

    /// Refresh a held-off candidate. Returns false if it is not held off.
    pub(crate) fn touch(&mut self, candidate: &Candidate, frame: u64) -> bool {
        match self.last_seen.get_mut(candidate) {
            Some(last) => {
                *last = frame;
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert(&mut self, candidate: Candidate, last_seen: u64) {
        self.last_seen.insert(candidate, last_seen);
    }

    /// Remove entries with `frame - last_seen >= window`
    pub(crate) fn expire(&mut self, frame: u64, window: u64) -> Vec<(Candidate, u64)> {
        let expired: Vec<(Candidate, u64)> = self
            .last_seen
            .iter()
            .filter(|(_, last)| frame.saturating_sub(**last) >= window)
            .map(|(candidate, last)| (candidate.clone(), *last))
            .collect();
        for (candidate, last) in &expired {
            debug!(frame, candidate = %candidate, last_seen = last, "holdoff drop");
            self.last_seen.remove(candidate);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbology;

    #[test]
    fn test_touch_only_updates_existing() {
        let mut set = HoldoffSet::new();
        let c = Candidate::new("x", Symbology::QrCode);
        assert!(!set.touch(&c, 4));
        set.insert(c.clone(), 1);
        assert!(set.touch(&c, 4));
        assert_eq!(set.last_seen(&c), Some(4));
    }

    #[test]
    fn test_expire_at_window_boundary() {
        let mut set = HoldoffSet::new();
        let c = Candidate::new("x", Symbology::QrCode);
        set.insert(c.clone(), 1);
        assert!(set.expire(20, 20).is_empty());
        assert_eq!(set.expire(21, 20), vec![(c, 1)]);
        assert_eq!(set.len(), 0);
    }
}
