//! Configuration for the analysis pipeline

use crate::cointegration::{CointegrationError, DeterministicTerm, Johansen, Significance};
use crate::generator::GeneratorConfig;
use crate::spread::DegeneratePolicy;
use crate::strategy::ThresholdConfig;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters passed to the Johansen test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JohansenConfig {
    /// Deterministic trend order: -1 none, 0 constant
    #[serde(default = "default_det_order")]
    pub det_order: i32,
    /// Number of lagged differences in the VECM
    #[serde(default = "default_lag_diffs")]
    pub lag_diffs: usize,
}

fn default_det_order() -> i32 {
    -1
}
fn default_lag_diffs() -> usize {
    1
}

impl Default for JohansenConfig {
    fn default() -> Self {
        Self {
            det_order: default_det_order(),
            lag_diffs: default_lag_diffs(),
        }
    }
}

impl JohansenConfig {
    /// Build the tester these parameters describe.
    pub fn tester(&self) -> Result<Johansen, CointegrationError> {
        Johansen::new(self.det_order, self.lag_diffs)
    }
}

/// Complete configuration of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub johansen: JohansenConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Handling of a zero-variance spread
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,

    /// Confidence level used to report the cointegration rank
    #[serde(default = "default_significance")]
    pub significance: Significance,
}

fn default_significance() -> Significance {
    Significance::P95
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            johansen: JohansenConfig::default(),
            thresholds: ThresholdConfig::default(),
            degenerate_policy: DegeneratePolicy::default(),
            significance: default_significance(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.generator.validate().map_err(|e| e.to_string())?;
        self.thresholds.validate()?;
        DeterministicTerm::try_from(self.johansen.det_order).map_err(|e| e.to_string())?;
        if self.johansen.lag_diffs >= self.generator.length {
            return Err(format!(
                "lag_diffs ({}) must be below the series length ({})",
                self.johansen.lag_diffs, self.generator.length
            ));
        }
        Ok(())
    }
}
