//! RustScan - scan confirmation for camera barcode scanners
//!
//! A barcode decoder run on every camera frame reports the same code many
//! times, misreads it now and then, and keeps reporting it for as long as it
//! is held up. This crate turns that stream into one clean event per scan:
//! a value must be seen in enough frames of a sliding window to be
//! confirmed, and a confirmed value stays quiet until it leaves view.
//!
//! Frame capture and decoding are left to the caller. Feed each frame's
//! candidates to a [`ConfirmationEngine`], or let a [`Session`] drive one
//! from a [`source::FrameSource`] into [`sink::ScanSink`]s.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Engine and session configuration
pub mod config;
/// Sliding-window confirmation with holdoff
pub mod engine;
/// Crate error type
pub mod error;
/// Core data structures (Candidate, Symbology, ScanEvent)
pub mod models;
/// Host loop tying a source, an engine and sinks together
pub mod session;
/// Confirmed-event consumers (console, CSV log, beep)
pub mod sink;
/// Frame sources (recordings, in-memory lists, producer threads)
pub mod source;
/// Recording discovery and batch replay
pub mod tools;

pub use config::{EngineConfig, ScanMode, SessionConfig};
pub use engine::{CandidateState, ConfirmationEngine};
pub use error::{Error, Result};
pub use models::{Candidate, ScanEvent, Symbology};
pub use session::{Session, SessionSummary};
