pub mod candidate;
pub mod event;

pub use candidate::{Candidate, Symbology};
pub use event::ScanEvent;
