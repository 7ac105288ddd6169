use clap::{Args, Parser, Subcommand};
use rust_scan::source::{FrameSource, RecordingSource, spawn_source};
use rust_scan::tools::{batch_limit_from_env, recordings_in, recordings_root_from_env, replay_batch};
use rust_scan::{EngineConfig, Result, ScanMode, Session, SessionConfig};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scantool", version, about = "RustScan CLI tools")]
struct Cli {
    /// Log engine decisions (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone, Copy)]
struct EngineArgs {
    /// Sightings needed within the scan window
    #[arg(long, env = "SCAN_REQUIRED_SCANS")]
    required_scans: Option<u32>,
    /// Scan window width in frames
    #[arg(long, env = "SCAN_WINDOW")]
    scan_window: Option<u64>,
    /// Holdoff after last sighting, in frames
    #[arg(long, env = "SCAN_HOLDOFF_FRAMES")]
    holdoff: Option<u64>,
    /// First frame index
    #[arg(long, env = "SCAN_START_FRAME")]
    start_frame: Option<u64>,
}

impl EngineArgs {
    fn resolve(self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(v) = self.required_scans {
            config.required_scans = v;
        }
        if let Some(v) = self.scan_window {
            config.scan_window = v;
        }
        if let Some(v) = self.holdoff {
            config.holdoff_window = v;
        }
        if let Some(v) = self.start_frame {
            config.start_frame = v;
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Confirm scans from a recorded candidate stream (stdin when no input)
    Replay {
        /// Recording with one JSON array of candidates per line
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Exit upon the first confirmed scan
        #[arg(long, short)]
        single: bool,
        /// Write confirmed scans to a CSV file
        #[arg(long, short)]
        output: bool,
        /// Directory for the CSV file
        #[arg(long, short = 'p', default_value = ".")]
        output_path: PathBuf,
        /// Suppress the confirmation beep
        #[arg(long, short)]
        mute: bool,
        /// Frames buffered between reader and engine
        #[arg(long, default_value_t = 64)]
        queue: usize,
        /// Stop after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Replay every recording under a directory in parallel
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Validate and print the effective engine configuration
    Check {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Replay {
            input,
            single,
            output,
            output_path,
            mute,
            queue,
            timeout_secs,
            engine,
        } => {
            let session = SessionConfig {
                mode: if single {
                    ScanMode::Single
                } else {
                    ScanMode::Continuous
                },
                mute,
                csv_dir: output.then_some(output_path),
            };
            replay_cmd(input, session, engine.resolve(), queue, timeout_secs)
        }
        Command::Batch {
            root,
            limit,
            engine,
        } => batch_cmd(root, limit, engine.resolve()),
        Command::Check { engine } => check_cmd(engine.resolve()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn replay_cmd(
    input: Option<PathBuf>,
    session_config: SessionConfig,
    engine_config: EngineConfig,
    queue: usize,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let single = session_config.mode == ScanMode::Single;
    let mut session = Session::with_default_sinks(engine_config, session_config)?;

    let source: Box<dyn FrameSource + Send> = match &input {
        Some(path) => Box::new(RecordingSource::open(path)?),
        None => Box::new(RecordingSource::new(BufReader::new(io::stdin()))),
    };
    let mut frames = spawn_source(source, engine_config.start_frame, queue);

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(secs) = timeout_secs {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            cancel.store(true, Ordering::Relaxed);
        });
    }

    if !single {
        eprintln!("*** Reading frames until end of input");
    }
    let summary = session.run(&mut frames, &cancel)?;
    eprintln!(
        "Done: {} frames, {} confirmed{}",
        summary.frames,
        summary.events.len(),
        if summary.cancelled { " (timed out)" } else { "" }
    );
    Ok(())
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>, config: EngineConfig) -> Result<()> {
    config.validate()?;
    let root = root.unwrap_or_else(recordings_root_from_env);
    let limit = limit.or_else(batch_limit_from_env);
    let paths = recordings_in(&root, limit);
    println!("Replaying {} recordings under {}", paths.len(), root.display());

    let mut total_frames = 0u64;
    let mut total_confirmed = 0usize;
    let mut failed = 0usize;
    for (path, result) in replay_batch(&paths, config) {
        match result {
            Ok(report) => {
                println!(
                    "  {}: {} frames, {} confirmed",
                    path.display(),
                    report.frames,
                    report.confirmed.len()
                );
                for (frame, candidate) in &report.confirmed {
                    println!("    frame {frame}: {candidate}");
                }
                total_frames += report.frames;
                total_confirmed += report.confirmed.len();
            }
            Err(err) => {
                println!("  {}: failed: {}", path.display(), err);
                failed += 1;
            }
        }
    }
    println!("Total: {total_frames} frames, {total_confirmed} confirmed, {failed} failed");
    Ok(())
}

fn check_cmd(config: EngineConfig) -> Result<()> {
    config.validate()?;
    println!("required_scans = {}", config.required_scans);
    println!("scan_window    = {}", config.scan_window);
    println!("holdoff_window = {}", config.holdoff_window);
    println!("start_frame    = {}", config.start_frame);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_engine_flags_read_scan_env_vars() {
        Cli::command().debug_assert();
        let cmd = Cli::command();
        let check = cmd.find_subcommand("check").expect("check subcommand");
        let envs: Vec<(String, String)> = check
            .get_arguments()
            .filter_map(|arg| {
                let env = arg.get_env()?.to_str()?.to_string();
                Some((arg.get_id().as_str().to_string(), env))
            })
            .collect();
        for (id, env) in [
            ("required_scans", "SCAN_REQUIRED_SCANS"),
            ("scan_window", "SCAN_WINDOW"),
            ("holdoff", "SCAN_HOLDOFF_FRAMES"),
            ("start_frame", "SCAN_START_FRAME"),
        ] {
            assert!(envs.contains(&(id.to_string(), env.to_string())), "{id}");
        }
    }

    #[test]
    fn test_flags_override_configuration() {
        let args = ["scantool", "check", "--scan-window", "9", "--holdoff", "3"];
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        let Command::Check { engine } = cli.command else {
            panic!("expected check");
        };
        let config = engine.resolve();
        assert_eq!(config.scan_window, 9);
        assert_eq!(config.holdoff_window, 3);
    }
}
