//! stepgrid - terminal step sequencer
//!
//! Run with: cargo run -- --bpm 96 --steps 8

mod app;
mod audio;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use env_logger::Env;
use stepgrid::sequencing::SchedulerConfig;

use app::App;

/// Step sequencer with lookahead scheduling
#[derive(Parser, Debug)]
#[command(name = "stepgrid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A terminal step sequencer", long_about = None)]
struct Args {
    /// Tempo in beats per minute (one step per beat)
    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    /// Number of steps in the grid
    #[arg(long, default_value_t = 16)]
    steps: usize,

    /// How far ahead of the audio clock notes are scheduled
    #[arg(long, value_name = "MS", default_value_t = 100)]
    lookahead_ms: u64,

    /// How often the scheduler polls
    #[arg(long, value_name = "MS", default_value_t = 25)]
    poll_ms: u64,

    /// Write logs to this file (logging is off otherwise; RUST_LOG sets the filter)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = SchedulerConfig::default()
        .lookahead(Duration::from_millis(args.lookahead_ms))
        .poll_interval(Duration::from_millis(args.poll_ms));

    let mut app = App::new(args.bpm, args.steps, config)?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}

/// The TUI owns the terminal, so logs can only go to a file
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
