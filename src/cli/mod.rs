//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for statarb,
//! including all subcommands and their arguments.

mod config;

pub use config::{parse_threshold_list, CliConfigError, RunCliConfig, SweepCliConfig};

use clap::{Args, Parser, Subcommand};

/// statarb - cointegration pairs analysis on a synthetic price pair
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Options shared by every subcommand that runs the pipeline.
///
/// Each override is applied on top of the JSON config file (or the
/// built-in defaults when no file is given).
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Path to a JSON pipeline configuration file
    #[arg(long)]
    pub config: Option<String>,
    /// Number of time steps to generate
    #[arg(long)]
    pub length: Option<usize>,
    /// Random seed for the synthetic pair
    #[arg(long)]
    pub seed: Option<u64>,
    /// Starting level of the first series
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<f64>,
    /// Cointegration coefficient of S2 on S1
    #[arg(long, allow_negative_numbers = true)]
    pub beta: Option<f64>,
    /// Standard deviation of the S1 random-walk increments
    #[arg(long)]
    pub s1_scale: Option<f64>,
    /// Standard deviation of the S2 noise
    #[arg(long)]
    pub s2_scale: Option<f64>,
    /// Johansen deterministic trend order: -1 (none) or 0 (constant)
    #[arg(long, allow_negative_numbers = true)]
    pub det_order: Option<i32>,
    /// Number of lagged differences in the Johansen VECM
    #[arg(long)]
    pub lag_diffs: Option<usize>,
    /// Z-score entry threshold
    #[arg(long)]
    pub entry_z: Option<f64>,
    /// Z-score exit threshold
    #[arg(long)]
    pub exit_z: Option<f64>,
    /// Zero-variance spread handling: 'error' or 'nan'
    #[arg(long)]
    pub degenerate_policy: Option<String>,
    /// Significance level for the reported rank: 90, 95 or 99
    #[arg(long)]
    pub significance: Option<String>,
    /// Output directory for results
    #[arg(long, default_value = "statarb_results")]
    pub output_dir: String,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline once and write results.csv and summary.json
    Run {
        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Backtest a grid of entry/exit thresholds on one spread
    Sweep {
        #[command(flatten)]
        args: PipelineArgs,
        /// Entry thresholds (comma-separated, e.g., "0.5,1.0,1.5")
        #[arg(long, default_value = "0.5,1.0,1.5,2.0,2.5")]
        entries: String,
        /// Exit thresholds (comma-separated, e.g., "0.0,0.25")
        #[arg(long, default_value = "0.0,0.25,0.5")]
        exits: String,
    },
}
