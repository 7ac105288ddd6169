//! Helpers shared by the CLI and benches: finding recorded candidate streams
//! and replaying them through fresh engines.

use crate::config::EngineConfig;
use crate::engine::ConfirmationEngine;
use crate::error::Result;
use crate::models::Candidate;
use crate::source::{FrameSource, RecordingSource};
use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default recordings root from `SCAN_RECORDINGS_ROOT`.
pub fn recordings_root_from_env() -> PathBuf {
    env::var("SCAN_RECORDINGS_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("recordings"))
}

/// Batch limit from `SCAN_BATCH_LIMIT`; unset or `0` means no limit.
pub fn batch_limit_from_env() -> Option<usize> {
    match env::var("SCAN_BATCH_LIMIT") {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Sorted `*.jsonl` recordings under `root`, searched recursively.
pub fn recordings_in<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut found = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    if let Some(limit) = limit {
        found.truncate(limit);
    }
    found
}

/// Result of replaying one recording
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Frames replayed
    pub frames: u64,
    /// Confirmed candidates with the frame that confirmed them
    pub confirmed: Vec<(u64, Candidate)>,
}

/// Replay any frame source through a fresh engine
pub fn replay<S: FrameSource + ?Sized>(source: &mut S, config: EngineConfig) -> Result<ReplayReport> {
    let mut engine = ConfirmationEngine::new(config)?;
    let mut report = ReplayReport {
        frames: 0,
        confirmed: Vec::new(),
    };
    while let Some((frame, candidates)) = source.next_indexed(engine.next_frame())? {
        for candidate in engine.process_frame(frame, candidates)? {
            report.confirmed.push((frame, candidate));
        }
        report.frames += 1;
    }
    Ok(report)
}

/// Replay a recording file through a fresh engine
pub fn replay_file<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<ReplayReport> {
    let mut source = RecordingSource::open(path)?;
    replay(&mut source, config)
}

/// Replay recordings in parallel, one independent engine per file.
///
/// Results come back in input order.
pub fn replay_batch(paths: &[PathBuf], config: EngineConfig) -> Vec<(PathBuf, Result<ReplayReport>)> {
    paths
        .par_iter()
        .map(|path| {
            let result = replay_file(path, config);
            debug!(path = %path.display(), ok = result.is_ok(), "replayed");
            (path.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbology;
    use crate::source::FrameList;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("rust_scan_tools_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn replay_reports_confirmation_frames() {
        let x = Candidate::new("x", Symbology::Ean8);
        let mut frames = FrameList::from(vec![vec![x.clone()], vec![], vec![x.clone()]]);
        let report = replay(&mut frames, EngineConfig::default()).unwrap();
        assert_eq!(report.frames, 3);
        assert_eq!(report.confirmed, vec![(2, x)]);
    }

    #[test]
    fn recordings_in_finds_sorted_jsonl_files() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("cam2")).unwrap();
        fs::write(dir.join("b.jsonl"), "").unwrap();
        fs::write(dir.join("cam2").join("a.JSONL"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let found = recordings_in(&dir, None);
        assert_eq!(found, vec![dir.join("b.jsonl"), dir.join("cam2").join("a.JSONL")]);
        assert_eq!(recordings_in(&dir, Some(1)).len(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn replay_batch_keeps_engines_independent() {
        let dir = temp_dir();
        let line = r#"[{"data":"42","type":"CODE39"}]"#;
        fs::write(dir.join("one.jsonl"), format!("{line}\n{line}\n")).unwrap();
        fs::write(dir.join("two.jsonl"), format!("{line}\n\n\n\n\n{line}\n")).unwrap();
        fs::write(dir.join("bad.jsonl"), "{oops\n").unwrap();

        let paths = recordings_in(&dir, None);
        let results = replay_batch(&paths, EngineConfig::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1.as_ref().unwrap().confirmed.len(), 1);
        assert_eq!(results[2].1.as_ref().unwrap().confirmed.len(), 0);
        let _ = fs::remove_dir_all(dir);
    }
}
