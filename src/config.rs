//! Engine and host configuration
//!
//! Engine defaults are 2 sightings within 5 frames and 20 frames of holdoff,
//! overridable through `SCAN_*` environment variables. Host-side options
//! live in [`SessionConfig`].

use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::warn;

/// Sightings needed inside the window before a value is confirmed
pub const DEFAULT_REQUIRED_SCANS: u32 = 2;
/// Width of the confirmation window in frames
pub const DEFAULT_SCAN_WINDOW: u64 = 5;
/// Frames a confirmed value stays suppressed after its last sighting
pub const DEFAULT_HOLDOFF_WINDOW: u64 = 20;

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

/// Confirmation engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum distinct-frame sightings within `scan_window` (>= 1)
    pub required_scans: u32,
    /// Sliding window width in frames (>= 1)
    pub scan_window: u64,
    /// Suppression window after the last sighting of a confirmed value
    pub holdoff_window: u64,
    /// Index of the first frame the engine expects
    pub start_frame: u64,
}

impl EngineConfig {
    /// Build a config with the default start frame
    pub fn new(required_scans: u32, scan_window: u64, holdoff_window: u64) -> Self {
        Self {
            required_scans,
            scan_window,
            holdoff_window,
            start_frame: 0,
        }
    }

    /// Defaults overridden by `SCAN_REQUIRED_SCANS`, `SCAN_WINDOW`,
    /// `SCAN_HOLDOFF_FRAMES` and `SCAN_START_FRAME`.
    ///
    /// Values that do not parse fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            required_scans: parse_env_u32("SCAN_REQUIRED_SCANS", DEFAULT_REQUIRED_SCANS),
            scan_window: parse_env_u64("SCAN_WINDOW", DEFAULT_SCAN_WINDOW),
            holdoff_window: parse_env_u64("SCAN_HOLDOFF_FRAMES", DEFAULT_HOLDOFF_WINDOW),
            start_frame: parse_env_u64("SCAN_START_FRAME", 0),
        }
    }

    /// Set the first expected frame index
    pub fn with_start_frame(mut self, start_frame: u64) -> Self {
        self.start_frame = start_frame;
        self
    }

    /// Reject parameters the engine cannot run with.
    ///
    /// A window narrower than `required_scans` is legal but can never
    /// confirm anything, so it only logs a warning.
    pub fn validate(&self) -> Result<()> {
        if self.required_scans < 1 {
            return Err(Error::invalid("required_scans", "must be at least 1"));
        }
        if self.scan_window < 1 {
            return Err(Error::invalid("scan_window", "must be at least 1"));
        }
        if self.scan_window < u64::from(self.required_scans) {
            warn!(
                required_scans = self.required_scans,
                scan_window = self.scan_window,
                "scan window narrower than required scans, threshold is unreachable"
            );
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_REQUIRED_SCANS,
            DEFAULT_SCAN_WINDOW,
            DEFAULT_HOLDOFF_WINDOW,
        )
    }
}

/// When the host stops consuming confirmed events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Keep scanning until the source ends or the run is cancelled
    #[default]
    Continuous,
    /// Stop after the first confirmed event
    Single,
}

/// Host-side options layered over the engine output
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Single-shot or continuous consumption
    pub mode: ScanMode,
    /// Suppress the confirmation beep
    pub mute: bool,
    /// Directory for the CSV log; `None` disables it
    pub csv_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scanner_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.required_scans, 2);
        assert_eq!(config.scan_window, 5);
        assert_eq!(config.holdoff_window, 20);
        assert_eq!(config.start_frame, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_required_scans_is_rejected() {
        let err = EngineConfig::new(0, 5, 20).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                field: "required_scans",
                ..
            }
        ));
    }

    #[test]
    fn zero_scan_window_is_rejected() {
        let err = EngineConfig::new(1, 0, 20).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                field: "scan_window",
                ..
            }
        ));
    }

    #[test]
    fn zero_holdoff_and_narrow_window_are_accepted() {
        assert!(EngineConfig::new(1, 1, 0).validate().is_ok());
        assert!(EngineConfig::new(4, 2, 0).validate().is_ok());
    }
}
