//! CLI commands.
//!
//! `serve` runs the HTTP server; `history` and `chart` work offline against
//! the same store the server writes, selected with `--store`/`--data`.

use crate::capture::SourceError;
use crate::chart::{BarChartRenderer, ChartError, ChartRenderer};
use clap::{Parser, Subcommand, ValueEnum};
use chrono::{Local, NaiveDate};
use repwise_core::counter::ThresholdError;
use repwise_core::{
    ArmSelection, JsonFileStore, RedbStore, SessionConfig, StoreError, Thresholds, WorkoutStore,
    weekly_totals,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Repwise: pose-driven repetition tracking.
#[derive(Debug, Parser)]
#[command(name = "repwise", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Bind address.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bind port.
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Store backend.
        #[arg(long, value_enum, default_value_t = StoreBackend::File)]
        store: StoreBackend,

        /// Store path (JSON file or redb database).
        #[arg(long, default_value = "workouts.json")]
        data: PathBuf,

        /// Which arms drive the counter.
        #[arg(long, value_enum, default_value_t = ArmChoice::Both)]
        arms: ArmChoice,

        /// Override the high (extension) threshold in degrees.
        #[arg(long)]
        high_deg: Option<f32>,

        /// Override the low (curl) threshold in degrees.
        #[arg(long)]
        low_deg: Option<f32>,

        /// Per-joint visibility gate.
        #[arg(long, default_value_t = 0.5)]
        min_visibility: f32,

        /// Replay a recorded pose stream (pull-mode ingestion) from a JSONL
        /// file instead of waiting for pushed frames.
        #[arg(long)]
        poses: Option<PathBuf>,

        /// Pull-mode tick interval in milliseconds.
        #[arg(long, default_value_t = 33)]
        tick_ms: u64,
    },

    /// Print the stored workout history.
    History {
        #[arg(long, value_enum, default_value_t = StoreBackend::File)]
        store: StoreBackend,

        #[arg(long, default_value = "workouts.json")]
        data: PathBuf,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Render the trailing week's bar chart to a PNG file.
    Chart {
        #[arg(long, value_enum, default_value_t = StoreBackend::File)]
        store: StoreBackend,

        #[arg(long, default_value = "workouts.json")]
        data: PathBuf,

        /// Output path.
        #[arg(long, default_value = "week.png")]
        out: PathBuf,

        /// Last day of the window (defaults to today).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

/// Durable store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Flat JSON file.
    File,
    /// redb embedded database.
    Redb,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Redb => write!(f, "redb"),
        }
    }
}

/// Arm selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArmChoice {
    Both,
    Left,
    Right,
}

impl std::fmt::Display for ArmChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmChoice::Both => write!(f, "both"),
            ArmChoice::Left => write!(f, "left"),
            ArmChoice::Right => write!(f, "right"),
        }
    }
}

impl From<ArmChoice> for ArmSelection {
    fn from(choice: ArmChoice) -> Self {
        match choice {
            ArmChoice::Both => ArmSelection::Both,
            ArmChoice::Left => ArmSelection::Left,
            ArmChoice::Right => ArmSelection::Right,
        }
    }
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open the selected store backend.
pub fn open_store(
    backend: StoreBackend,
    path: &Path,
) -> Result<Box<dyn WorkoutStore + Send>, StoreError> {
    match backend {
        StoreBackend::File => Ok(Box::new(JsonFileStore::open(path)?)),
        StoreBackend::Redb => Ok(Box::new(RedbStore::open(path)?)),
    }
}

/// Build the session config from CLI flags, validating the threshold band.
pub fn session_config(
    arms: ArmChoice,
    high_deg: Option<f32>,
    low_deg: Option<f32>,
    min_visibility: f32,
) -> Result<SessionConfig, ThresholdError> {
    let arms: ArmSelection = arms.into();
    let defaults = Thresholds::for_arms(arms);
    let thresholds = Thresholds::new(
        high_deg.unwrap_or_else(|| defaults.high_deg()),
        low_deg.unwrap_or_else(|| defaults.low_deg()),
    )?;
    Ok(SessionConfig {
        arms,
        thresholds,
        min_visibility,
    })
}

/// Print the stored workout history.
pub fn cmd_history(backend: StoreBackend, path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_store(backend, path)?;
    let mut entries = store.load()?;
    entries.sort_by_key(|e| e.date);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("no workouts recorded");
        return Ok(());
    }
    println!("{:<12} {:>6}", "date", "reps");
    for entry in &entries {
        println!("{:<12} {:>6}", entry.date, entry.count);
    }
    Ok(())
}

/// Render the trailing week's chart to `out`.
pub fn cmd_chart(
    backend: StoreBackend,
    path: &Path,
    out: &Path,
    end: Option<NaiveDate>,
) -> Result<(), CliError> {
    let store = open_store(backend, path)?;
    let entries = store.load()?;
    let end = end.unwrap_or_else(|| Local::now().date_naive());
    let week = weekly_totals(&entries, end);

    let png = BarChartRenderer::default().render(&week)?;
    std::fs::write(out, png)?;
    println!("wrote {} ({} days ending {end})", out.display(), week.len());
    Ok(())
}
