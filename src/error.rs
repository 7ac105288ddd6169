//! Error types for scan confirmation and its host plumbing

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine, sources and sinks
#[derive(Error, Debug)]
pub enum Error {
    /// Engine parameters failed validation at construction
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration {
        /// Offending parameter name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Frame index did not follow the previous one by exactly one
    #[error("out of order frame: expected {expected}, got {got}")]
    OutOfOrderFrame {
        /// Index the engine was waiting for
        expected: u64,
        /// Index the caller supplied
        got: u64,
    },

    /// The frame index has no successor, so the frame clock cannot advance
    #[error("frame clock exhausted at frame {frame}")]
    FrameClockExhausted {
        /// Last representable frame index
        frame: u64,
    },

    /// I/O failure in a source or sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded frame line could not be parsed
    #[error("recording line {line}: {reason}")]
    Recording {
        /// 1-based line number
        line: usize,
        /// Parser message
        reason: String,
    },

    /// A scan log row could not be parsed
    #[error("scan log line {line}: {reason}")]
    Log {
        /// 1-based line number where the row starts
        line: usize,
        /// Parser message
        reason: String,
    },

    /// Audio output device failure
    #[error("audio error: {0}")]
    Audio(String),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
