//! Command-line parsing for the pumpkin launch fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from command
//! dispatch (`crate::app`) and from the modeling/math code.
//!
//! Numeric values are taken as text and validated by `crate::input`, so the CLI
//! and the TUI reject bad input with the same messages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default trial table, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "pumpkin.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "launch",
    version,
    about = "Pumpkin launcher: fit distance ~ mass + pull strength and predict the pull needed"
)]
pub struct Cli {
    /// Trial table CSV (`mass(g),pull strength(lbs),distance feet`).
    #[arg(long, global = true, env = "LAUNCH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (the default when no subcommand is given).
    Tui,
    /// Fit the table and print the coefficients.
    Fit,
    /// Predict the pull strength needed to reach a distance.
    Predict(TargetArgs),
    /// Per-trial residuals and percent error of the fitted model.
    Report(ReportArgs),
    /// ASCII plot of distance vs pull strength at a fixed mass.
    Plot(PlotArgs),
    /// Write the current fit to JSON.
    Export(ExportArgs),
    /// Inspect or edit the trial table.
    #[command(subcommand)]
    Data(DataCommand),
}

/// Mass and target distance, as typed.
#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    /// Pumpkin mass (g).
    #[arg(short, long, allow_hyphen_values = true)]
    pub mass: String,

    /// Target distance (feet).
    #[arg(short, long, allow_hyphen_values = true)]
    pub distance: String,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Also write the residual table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output JSON path.
    #[arg(short, long, value_name = "JSON")]
    pub out: PathBuf,
}

/// One trial, as typed.
#[derive(Debug, Args, Clone)]
pub struct TrialArgs {
    /// Pumpkin mass (g).
    #[arg(short, long, allow_hyphen_values = true)]
    pub mass: String,

    /// Pull strength (lbs).
    #[arg(short, long, allow_hyphen_values = true)]
    pub force: String,

    /// Distance reached (feet).
    #[arg(short, long, allow_hyphen_values = true)]
    pub distance: String,
}

#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Print the table with row indices.
    List,
    /// Append a trial.
    Add(TrialArgs),
    /// Replace the trial at ROW (0-based).
    Update {
        row: usize,
        #[command(flatten)]
        trial: TrialArgs,
    },
    /// Delete the trials at the given rows (0-based).
    Delete {
        #[arg(required = true, num_args = 1..)]
        rows: Vec<usize>,
    },
    /// Create an empty table.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Create a table of synthetic trials drawn from a known plane.
    Generate {
        /// Number of trials.
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Random seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Standard deviation of the distance noise (feet).
        #[arg(long, default_value_t = 2.0, value_parser = crate::input::parse_cli_number)]
        noise: f64,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}
