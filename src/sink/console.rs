use super::ScanSink;
use crate::error::Result;
use crate::models::ScanEvent;
use std::io::{self, Stdout, Write};

/// Prints `Barcode N: <payload> (<symbology>)` per event
pub struct ConsoleSink<W = Stdout> {
    out: W,
}

impl ConsoleSink<Stdout> {
    /// Print to standard output
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Print to any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ScanSink for ConsoleSink<W> {
    fn on_confirmed(&mut self, event: &ScanEvent) -> Result<()> {
        writeln!(
            self.out,
            "Barcode {}: {} ({})",
            event.sequence, event.candidate.payload, event.candidate.symbology
        )?;
        self.out.flush()?;
        Ok(())
    }
}
