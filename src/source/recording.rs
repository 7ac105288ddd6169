use super::FrameSource;
use crate::error::{Error, Result};
use crate::models::Candidate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Recorded candidate stream, one frame per line.
///
/// Each line is a JSON array of `{"data": ..., "type": ...}` objects. A blank
/// line is a frame with no candidates; lines starting with `#` are skipped.
pub struct RecordingSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl RecordingSource<BufReader<File>> {
    /// Open a recording file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordingSource<R> {
    /// Read frames from any buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Parse one recorded line; `None` for comment lines
pub fn parse_frame_line(text: &str, line: usize) -> Result<Option<Vec<Candidate>>> {
    let trimmed = text.trim();
    if trimmed.starts_with('#') {
        return Ok(None);
    }
    if trimmed.is_empty() {
        return Ok(Some(Vec::new()));
    }
    serde_json::from_str::<Vec<Candidate>>(trimmed)
        .map(Some)
        .map_err(|err| Error::Recording {
            line,
            reason: err.to_string(),
        })
}

impl<R: BufRead> FrameSource for RecordingSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<Candidate>>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if let Some(frame) = parse_frame_line(&self.buf, self.line)? {
                return Ok(Some(frame));
            }
        }
    }
}
