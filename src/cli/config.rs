//! CLI configuration structs bridging CLI arguments to domain types.
//!
//! These structs decouple the CLI parsing layer from the pipeline,
//! allowing command handlers to work with validated, typed configurations.

use super::PipelineArgs;
use crate::pipeline::{ConfigError, GridSearchConfig, PipelineConfig};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when turning CLI arguments into a configuration.
#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    InvalidOption(String),

    #[error("Invalid number '{value}' in --{name}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("--{0} needs at least one value")]
    EmptyList(&'static str),
}

/// Validated configuration for the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunCliConfig {
    pub pipeline: PipelineConfig,
    pub output_dir: PathBuf,
}

/// Validated configuration for the `sweep` subcommand.
#[derive(Debug, Clone)]
pub struct SweepCliConfig {
    pub run: RunCliConfig,
    pub grid: GridSearchConfig,
}

impl RunCliConfig {
    /// Load the config file (if any), then apply command-line overrides.
    ///
    /// # Errors
    /// Returns `CliConfigError` if the file cannot be loaded, an option does
    /// not parse, or the merged configuration is invalid.
    pub fn from_args(args: &PipelineArgs) -> Result<Self, CliConfigError> {
        let mut config = match &args.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        let generator = &mut config.generator;
        if let Some(length) = args.length {
            generator.length = length;
        }
        if let Some(seed) = args.seed {
            generator.seed = seed;
        }
        if let Some(offset) = args.offset {
            generator.offset = offset;
        }
        if let Some(beta) = args.beta {
            generator.beta = beta;
        }
        if let Some(scale) = args.s1_scale {
            generator.s1_scale = scale;
        }
        if let Some(scale) = args.s2_scale {
            generator.s2_scale = scale;
        }

        if let Some(order) = args.det_order {
            config.johansen.det_order = order;
        }
        if let Some(lags) = args.lag_diffs {
            config.johansen.lag_diffs = lags;
        }
        if let Some(entry) = args.entry_z {
            config.thresholds.entry_z = entry;
        }
        if let Some(exit) = args.exit_z {
            config.thresholds.exit_z = exit;
        }
        if let Some(policy) = &args.degenerate_policy {
            config.degenerate_policy = policy.parse().map_err(CliConfigError::InvalidOption)?;
        }
        if let Some(level) = &args.significance {
            config.significance = level.parse().map_err(CliConfigError::InvalidOption)?;
        }

        config
            .validate()
            .map_err(|e| CliConfigError::Config(ConfigError::Invalid(e)))?;

        Ok(Self {
            pipeline: config,
            output_dir: PathBuf::from(&args.output_dir),
        })
    }
}

impl SweepCliConfig {
    pub fn from_args(
        args: &PipelineArgs,
        entries: &str,
        exits: &str,
    ) -> Result<Self, CliConfigError> {
        let grid = GridSearchConfig {
            entries: parse_threshold_list("entries", entries)?,
            exits: parse_threshold_list("exits", exits)?,
        };
        grid.validate().map_err(CliConfigError::InvalidOption)?;
        Ok(Self {
            run: RunCliConfig::from_args(args)?,
            grid,
        })
    }
}

/// Parse a comma-separated list of thresholds such as `"0.5, 1.0,1.5"`.
pub fn parse_threshold_list(name: &'static str, raw: &str) -> Result<Vec<f64>, CliConfigError> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| CliConfigError::InvalidNumber {
                name,
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(CliConfigError::EmptyList(name));
    }
    Ok(values)
}
