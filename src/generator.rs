//! Synthetic cointegrated pair generator.
//!
//! Produces a random walk `S1` and a second leg `S2 = beta * S1 + noise`,
//! so that `S2 - beta * S1` is stationary by construction.
//!
//! All draws come from a single `ChaCha8Rng` seeded from the config, S1
//! increments first and S2 noise second, so a given config always yields
//! bit-identical series.

use crate::types::{PricePair, PriceSeries};

use rand::distributions::Distribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use thiserror::Error;
use tracing::debug;

/// Errors raised before any series is generated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Series length must be at least one step
    #[error("Invalid series length: {0} (must be positive)")]
    InvalidLength(usize),

    /// Noise scales must be finite and non-negative
    #[error("Invalid noise scale for {name}: {value}")]
    InvalidScale { name: &'static str, value: f64 },

    /// Offset and beta must be finite
    #[error("Non-finite parameter {name}: {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    /// The normal distribution could not be constructed
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Parameters of the synthetic pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of time steps in each series
    #[serde(default = "default_length")]
    pub length: usize,

    /// RNG seed; identical seeds reproduce identical series
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Level the S1 random walk starts from
    #[serde(default = "default_offset")]
    pub offset: f64,

    /// True hedge ratio linking S2 to S1
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Standard deviation of the S1 random-walk increments
    #[serde(default = "default_scale")]
    pub s1_scale: f64,

    /// Standard deviation of the S2 idiosyncratic noise
    #[serde(default = "default_scale")]
    pub s2_scale: f64,
}

fn default_length() -> usize {
    500
}
fn default_seed() -> u64 {
    42
}
fn default_offset() -> f64 {
    100.0
}
fn default_beta() -> f64 {
    0.5
}
fn default_scale() -> f64 {
    1.0
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            seed: default_seed(),
            offset: default_offset(),
            beta: default_beta(),
            s1_scale: default_scale(),
            s2_scale: default_scale(),
        }
    }
}

impl GeneratorConfig {
    /// Check parameters without generating anything.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.length == 0 {
            return Err(GeneratorError::InvalidLength(self.length));
        }
        for (name, value) in [("offset", self.offset), ("beta", self.beta)] {
            if !value.is_finite() {
                return Err(GeneratorError::NonFiniteParameter { name, value });
            }
        }
        for (name, value) in [("s1_scale", self.s1_scale), ("s2_scale", self.s2_scale)] {
            if !value.is_finite() || value < 0.0 {
                return Err(GeneratorError::InvalidScale { name, value });
            }
        }
        Ok(())
    }
}

/// Generate the pair described by `config`.
///
/// `S1[t] = offset + Σ_{u<=t} e_u`, `e_u ~ N(0, s1_scale²)`
/// `S2[t] = beta * S1[t] + η_t`, `η_t ~ N(0, s2_scale²)`
///
/// # Errors
/// Returns `GeneratorError` if the config fails validation.
pub fn generate_pair(config: &GeneratorConfig) -> Result<PricePair, GeneratorError> {
    config.validate()?;

    let normal =
        Normal::new(0.0, 1.0).map_err(|e| GeneratorError::Distribution(e.to_string()))?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let s1: Vec<f64> = (0..config.length)
        .map(|_| normal.sample(&mut rng) * config.s1_scale)
        .scan(config.offset, |level, step| {
            *level += step;
            Some(*level)
        })
        .collect();

    let s2: Vec<f64> = s1
        .iter()
        .map(|p| config.beta * p + normal.sample(&mut rng) * config.s2_scale)
        .collect();

    debug!(
        length = config.length,
        seed = config.seed,
        beta = config.beta,
        "Generated synthetic pair"
    );

    Ok(PricePair {
        s1: PriceSeries::new("S1", s1),
        s2: PriceSeries::new("S2", s2),
    })
}
