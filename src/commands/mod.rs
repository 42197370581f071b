//! CLI command handlers.
//!
//! This module contains the implementation for each CLI subcommand,
//! delegating to the analysis pipeline and the report writers.

mod run;
mod sweep;

pub use run::run_pipeline;
pub use sweep::run_threshold_sweep;
