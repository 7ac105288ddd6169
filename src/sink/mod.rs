//! Downstream side: what happens to confirmed scans
//!
//! The engine only returns confirmed candidates. The session stamps them into
//! [`ScanEvent`]s and hands each one to every registered [`ScanSink`].

mod beep;
mod console;
mod csv;

pub use beep::BeepSink;
pub use console::ConsoleSink;
pub use csv::{CSV_HEADER, CsvSink, LogRecord, log_file_name, read_log};

use crate::error::Result;
use crate::models::ScanEvent;

/// Consumer of confirmed scan events
pub trait ScanSink {
    /// Called once per confirmed event, in emission order
    fn on_confirmed(&mut self, event: &ScanEvent) -> Result<()>;

    /// Called once when the session stops
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
