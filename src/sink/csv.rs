use super::ScanSink;
use crate::error::{Error, Result};
use crate::models::{Candidate, ScanEvent, Symbology};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::info;

/// First line of every scan log
pub const CSV_HEADER: &str = "timestamp,code,type";

/// `barcodes_<UTC timestamp>.csv`
pub fn log_file_name(now: DateTime<Utc>) -> String {
    format!("barcodes_{}.csv", now.format("%Y%m%dT%H%M%SZ"))
}

/// Appends `timestamp,payload,symbology` per event.
///
/// Timestamps are Unix seconds with microsecond precision. A field holding
/// a comma, a double quote or a line break is quoted RFC 4180 style, with
/// inner quotes doubled; everything else is written verbatim.
pub struct CsvSink<W: Write> {
    writer: W,
    path: Option<PathBuf>,
    rows: u64,
}

impl CsvSink<BufWriter<File>> {
    /// Create a new timestamped log file inside `dir`
    pub fn create_in<P: AsRef<Path>>(dir: P, now: DateTime<Utc>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(log_file_name(now));
        let file = File::create(&path)?;
        info!(path = %path.display(), "writing scan log");
        let mut sink = Self::from_writer(BufWriter::new(file))?;
        sink.path = Some(path);
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    /// Write the header to `writer` and log events into it
    pub fn from_writer(mut writer: W) -> Result<Self> {
        writeln!(writer, "{CSV_HEADER}")?;
        writer.flush()?;
        Ok(Self {
            writer,
            path: None,
            rows: 0,
        })
    }

    /// Backing file, when created with [`CsvSink::create_in`]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ScanSink for CsvSink<W> {
    fn on_confirmed(&mut self, event: &ScanEvent) -> Result<()> {
        writeln!(
            self.writer,
            "{:.6},{},{}",
            event.unix_seconds(),
            quote_field(&event.candidate.payload),
            quote_field(event.candidate.symbology.as_str())
        )?;
        // One row per scan must survive a crash
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        if let Some(path) = &self.path {
            info!(path = %path.display(), rows = self.rows, "closing scan log");
        }
        Ok(())
    }
}

fn quote_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// One parsed scan log row
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Unix seconds
    pub timestamp: f64,
    /// Logged value
    pub candidate: Candidate,
}

struct Row {
    line: usize,
    fields: Vec<String>,
}

/// Split `text` into rows of fields, honouring quoted fields that span lines
fn split_rows(text: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => quoted = true,
            ',' => fields.push(mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(mem::take(&mut field));
                rows.push(Row {
                    line: row_start,
                    fields: mem::take(&mut fields),
                });
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if quoted {
        return Err(Error::Log {
            line: row_start,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(Row {
            line: row_start,
            fields,
        });
    }
    Ok(rows)
}

/// Parse a scan log back into records, skipping the header.
///
/// Rows written before quoting was introduced carry raw commas in the
/// payload; any fields between the timestamp and the last one are joined
/// back together.
pub fn read_log(text: &str) -> Result<Vec<LogRecord>> {
    let mut records = Vec::new();
    for (idx, row) in split_rows(text)?.into_iter().enumerate() {
        let Row { line, mut fields } = row;
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        if idx == 0 && fields.join(",") == CSV_HEADER {
            continue;
        }
        let bad = |reason: &str| Error::Log {
            line,
            reason: reason.to_string(),
        };
        match fields.len() {
            1 => return Err(bad("missing payload")),
            2 => return Err(bad("missing type")),
            _ => {}
        }
        let symbology = fields.pop().unwrap_or_default();
        let timestamp = fields.remove(0);
        let timestamp = timestamp
            .trim()
            .parse::<f64>()
            .map_err(|_| bad("invalid timestamp"))?;
        records.push(LogRecord {
            timestamp,
            candidate: Candidate::new(fields.join(","), Symbology::from_tag(&symbology)),
        });
    }
    Ok(records)
}
