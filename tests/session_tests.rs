//! End-to-end tests: recorded frames through the producer queue, a session,
//! and the CSV log.

use chrono::Utc;
use rust_scan::sink::{CSV_HEADER, CsvSink, read_log};
use rust_scan::source::{FrameList, RecordingSource, spawn_source};
use rust_scan::{Candidate, EngineConfig, ScanMode, Session, SessionConfig, Symbology};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX epoch")
        .as_nanos();
    let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("rust_scan_{tag}_{nanos}_{sequence}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

const EAN: &str = r#"{"data":"4006381333931","type":"EAN13"}"#;
const QR: &str = r#"{"data":"https://example.com/a,b","type":"QRCODE"}"#;

fn recording() -> String {
    // EAN held in view for 30 frames, QR flickering in and out
    let mut lines = Vec::new();
    for frame in 0..30 {
        let mut items = vec![EAN];
        if frame % 3 == 0 {
            items.push(QR);
        }
        lines.push(format!("[{}]", items.join(",")));
    }
    lines.push("# camera covered".to_string());
    for _ in 0..25 {
        lines.push(String::new());
    }
    lines.push(format!("[{EAN}]"));
    lines.push(format!("[{EAN}]"));
    lines.join("\n") + "\n"
}

#[test]
fn test_recording_through_queue_into_csv() {
    let dir = temp_dir("session");
    let input = dir.join("cam0.jsonl");
    fs::write(&input, recording()).unwrap();

    let mut session = Session::new(EngineConfig::default(), SessionConfig::default()).unwrap();
    let sink = CsvSink::create_in(&dir, Utc::now()).unwrap();
    let log_path = sink.path().unwrap().to_path_buf();
    session.add_sink(sink);

    let mut frames = spawn_source(RecordingSource::open(&input).unwrap(), 0, 4);
    let summary = session.run(&mut frames, &AtomicBool::new(false)).unwrap();

    assert_eq!(summary.frames, 57);
    let confirmed: Vec<(u64, &str)> = summary
        .events
        .iter()
        .map(|e| (e.frame_index, e.candidate.payload.as_str()))
        .collect();
    // EAN at 1, QR (frames 0 and 3) at 3, EAN again after its holdoff lapsed
    assert_eq!(
        confirmed,
        vec![
            (1, "4006381333931"),
            (3, "https://example.com/a,b"),
            (56, "4006381333931"),
        ]
    );
    let sequences: Vec<u64> = summary.events.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);

    let text = fs::read_to_string(&log_path).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
    let records = read_log(&text).unwrap();
    let logged: Vec<Candidate> = records.into_iter().map(|r| r.candidate).collect();
    let emitted: Vec<Candidate> = summary.events.iter().map(|e| e.candidate.clone()).collect();
    assert_eq!(logged, emitted);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_single_mode_with_default_sinks() {
    let dir = temp_dir("single");
    let config = SessionConfig {
        mode: ScanMode::Single,
        mute: true,
        csv_dir: Some(dir.clone()),
    };
    let mut session = Session::with_default_sinks(EngineConfig::default(), config).unwrap();
    let code = Candidate::new("A-1", Symbology::Code39);
    let mut frames = FrameList::from(vec![vec![code.clone()]; 10]);
    let summary = session.run(&mut frames, &AtomicBool::new(false)).unwrap();
    assert_eq!(summary.events.len(), 1);
    assert_eq!(summary.frames, 2);
    assert_eq!(session.confirmed(), 1);

    let logs: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .collect();
    assert_eq!(logs.len(), 1);
    let records = read_log(&fs::read_to_string(&logs[0]).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].candidate, code);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_invalid_engine_config_rejected_by_session() {
    let result = Session::new(EngineConfig::new(0, 5, 20), SessionConfig::default());
    assert!(result.is_err());
}
