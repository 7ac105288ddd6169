//! Host loop around one confirmation engine
//!
//! Pulls frames from a [`FrameSource`], stamps confirmed candidates with a
//! sequence number and wall-clock time, and fans them out to sinks. The
//! single-shot policy lives here, not in the engine.

use crate::config::{EngineConfig, ScanMode, SessionConfig};
use crate::engine::ConfirmationEngine;
use crate::error::Result;
use crate::models::{Candidate, ScanEvent};
use crate::sink::{BeepSink, ConsoleSink, CsvSink, ScanSink};
use crate::source::FrameSource;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Outcome of [`Session::run`]
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    /// Frames processed
    pub frames: u64,
    /// Events emitted, in order
    pub events: Vec<ScanEvent>,
    /// True when the cancel flag stopped the run
    pub cancelled: bool,
}

/// Drives an engine from a frame source into a set of sinks
pub struct Session {
    engine: ConfirmationEngine,
    config: SessionConfig,
    sinks: Vec<Box<dyn ScanSink>>,
    sequence: u64,
}

impl Session {
    /// Session with no sinks attached
    pub fn new(engine_config: EngineConfig, config: SessionConfig) -> Result<Self> {
        Ok(Self {
            engine: ConfirmationEngine::new(engine_config)?,
            config,
            sinks: Vec::new(),
            sequence: 0,
        })
    }

    /// Session printing to stdout, beeping unless muted, and logging to CSV
    /// when a log directory is configured
    pub fn with_default_sinks(engine_config: EngineConfig, config: SessionConfig) -> Result<Self> {
        let mut session = Self::new(engine_config, config)?;
        session.add_sink(ConsoleSink::stdout());
        session.add_sink(BeepSink::new(session.config.mute)?);
        if let Some(dir) = session.config.csv_dir.clone() {
            session.add_sink(CsvSink::create_in(dir, Utc::now())?);
        }
        Ok(session)
    }

    /// Register a sink; sinks see events in registration order
    pub fn add_sink<S: ScanSink + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    /// Underlying engine
    pub fn engine(&self) -> &ConfirmationEngine {
        &self.engine
    }

    /// Host options
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Confirmations emitted so far
    pub fn confirmed(&self) -> u64 {
        self.sequence
    }

    /// Feed one frame and dispatch whatever it confirms.
    ///
    /// In single mode only the first confirmation of the session is
    /// dispatched; later frames return nothing.
    pub fn step(&mut self, candidates: Vec<Candidate>) -> Result<Vec<ScanEvent>> {
        self.step_at(self.engine.next_frame(), candidates)
    }

    /// Feed one frame under an index assigned upstream.
    ///
    /// An index the engine is not expecting fails with
    /// [`Error::OutOfOrderFrame`](crate::Error::OutOfOrderFrame).
    pub fn step_at(
        &mut self,
        frame_index: u64,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<ScanEvent>> {
        let confirmed = self.engine.process_frame(frame_index, candidates)?;
        let mut events = Vec::with_capacity(confirmed.len());
        for candidate in confirmed {
            if self.is_done() {
                break;
            }
            self.sequence += 1;
            let event = ScanEvent::now(self.sequence, frame_index, candidate);
            for sink in self.sinks.iter_mut() {
                sink.on_confirmed(&event)?;
            }
            events.push(event);
        }
        Ok(events)
    }

    /// Run until the source ends, `cancel` is set, or single mode is satisfied.
    ///
    /// Sinks are finished on every exit path. The first error wins.
    pub fn run<S>(&mut self, source: &mut S, cancel: &AtomicBool) -> Result<SessionSummary>
    where
        S: FrameSource + ?Sized,
    {
        info!(mode = ?self.config.mode, start_frame = self.engine.next_frame(), "session started");
        let mut summary = SessionSummary::default();
        let outcome = self.pump(source, cancel, &mut summary);

        let mut finished = Ok(());
        for sink in self.sinks.iter_mut() {
            if let Err(err) = sink.finish() {
                warn!(error = %err, "sink failed to finish");
                if finished.is_ok() {
                    finished = Err(err);
                }
            }
        }
        outcome?;
        finished?;

        info!(
            frames = summary.frames,
            confirmed = summary.events.len(),
            cancelled = summary.cancelled,
            "session stopped"
        );
        Ok(summary)
    }

    fn pump<S>(
        &mut self,
        source: &mut S,
        cancel: &AtomicBool,
        summary: &mut SessionSummary,
    ) -> Result<()>
    where
        S: FrameSource + ?Sized,
    {
        while !self.is_done() {
            if cancel.load(Ordering::Relaxed) {
                summary.cancelled = true;
                break;
            }
            let Some((frame_index, candidates)) = source.next_indexed(self.engine.next_frame())?
            else {
                break;
            };
            let events = self.step_at(frame_index, candidates)?;
            summary.frames += 1;
            summary.events.extend(events);
        }
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.config.mode == ScanMode::Single && self.sequence > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Symbology;
    use crate::source::{FrameList, spawn_source};

    fn qr(payload: &str) -> Candidate {
        Candidate::new(payload, Symbology::QrCode)
    }

    #[test]
    fn test_continuous_run_collects_all_events() {
        let mut session = Session::new(EngineConfig::default(), SessionConfig::default()).unwrap();
        let mut frames = FrameList::from(vec![
            vec![qr("a"), qr("b")],
            vec![qr("a"), qr("b")],
            vec![],
        ]);
        let summary = session.run(&mut frames, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.frames, 3);
        let payloads: Vec<&str> = summary
            .events
            .iter()
            .map(|e| e.candidate.payload.as_str())
            .collect();
        assert_eq!(payloads, vec!["a", "b"]);
        assert_eq!(summary.events[1].sequence, 2);
        assert_eq!(summary.events[1].frame_index, 1);
    }

    #[test]
    fn test_single_mode_stops_after_first_event() {
        let config = SessionConfig {
            mode: ScanMode::Single,
            ..SessionConfig::default()
        };
        let mut session = Session::new(EngineConfig::default(), config).unwrap();
        let mut frames = FrameList::from(vec![
            vec![qr("a"), qr("b")],
            vec![qr("a"), qr("b")],
            vec![qr("c")],
            vec![qr("c")],
        ]);
        let summary = session.run(&mut frames, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.events.len(), 1);
        assert_eq!(summary.events[0].candidate, qr("a"));
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_queue_index_mismatch_is_reported() {
        let mut session = Session::new(EngineConfig::default(), SessionConfig::default()).unwrap();
        let mut frames = spawn_source(FrameList::from(vec![vec![qr("a")]; 3]), 5, 2);
        let err = session.run(&mut frames, &AtomicBool::new(false)).unwrap_err();
        assert!(matches!(err, Error::OutOfOrderFrame { expected: 0, got: 5 }));
        assert_eq!(session.engine().next_frame(), 0);
    }

    #[test]
    fn test_queue_indices_drive_the_engine() {
        let config = EngineConfig::default().with_start_frame(5);
        let mut session = Session::new(config, SessionConfig::default()).unwrap();
        let mut frames = spawn_source(FrameList::from(vec![vec![qr("a")]; 3]), 5, 2);
        let summary = session.run(&mut frames, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.events.len(), 1);
        assert_eq!(summary.events[0].frame_index, 6);
        assert_eq!(session.engine().next_frame(), 8);
    }

    #[test]
    fn test_cancel_flag_stops_before_next_frame() {
        let mut session = Session::new(EngineConfig::default(), SessionConfig::default()).unwrap();
        let mut frames = FrameList::from(vec![vec![qr("a")], vec![qr("a")]]);
        let summary = session.run(&mut frames, &AtomicBool::new(true)).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.frames, 0);
        assert_eq!(session.engine().next_frame(), 0);
    }
}
