//! Pairs analysis pipeline
//!
//! Runs the five stages in order, each consuming the previous stage's
//! immutable output:
//!
//! 1. generate the synthetic pair
//! 2. cointegration test (first weighting vector)
//! 3. spread and full-sample z-score
//! 4. z-score threshold positions
//! 5. lagged P&L and summary
//!
//! # Example
//!
//! ```ignore
//! use statarb::pipeline::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::from_config(PipelineConfig::default())?;
//! let report = pipeline.run()?;
//! println!("net P&L: {}", report.backtest.summary.net_pnl);
//! ```

pub mod config;
pub mod error;
pub mod sweep;

pub use config::{ConfigError, JohansenConfig, PipelineConfig};
pub use error::PipelineError;
pub use sweep::{run_sweep, GridSearchConfig, SweepResult};

use crate::backtest::{self, BacktestResult};
use crate::cointegration::{CointegrationResult, CointegrationTester, Johansen};
use crate::diagnostics::{self, SpreadDiagnostics};
use crate::generator::generate_pair;
use crate::spread::{compute_spread, compute_zscore};
use crate::strategy::ZScoreThreshold;
use crate::types::{PricePair, SpreadSeries, ZScoreSeries};

use tracing::{info, instrument, warn};

/// Output of stages 2 and 3, reusable across signal parameterizations
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSpread {
    pub cointegration: CointegrationResult,
    pub spread: SpreadSeries,
    pub zscores: ZScoreSeries,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub config: PipelineConfig,
    pub prices: PricePair,
    pub cointegration: CointegrationResult,
    pub spread: SpreadSeries,
    pub zscores: ZScoreSeries,
    pub backtest: BacktestResult,
    pub diagnostics: SpreadDiagnostics,
}

impl PipelineReport {
    /// Cointegration rank at the configured significance level.
    pub fn cointegration_rank(&self) -> usize {
        self.cointegration.rank(self.config.significance)
    }
}

/// The pairs pipeline, generic over the cointegration test it calls.
pub struct Pipeline<T: CointegrationTester> {
    config: PipelineConfig,
    tester: T,
}

impl Pipeline<Johansen> {
    /// Pipeline using the Johansen test described by `config.johansen`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::InvalidConfig)?;
        let tester = config.johansen.tester()?;
        Ok(Self { config, tester })
    }
}

impl<T: CointegrationTester> Pipeline<T> {
    /// Pipeline with a caller-supplied cointegration test.
    pub fn with_tester(config: PipelineConfig, tester: T) -> Self {
        Self { config, tester }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate the configured pair and run every stage on it.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let prices = generate_pair(&self.config.generator)?;
        info!(
            length = prices.len(),
            seed = self.config.generator.seed,
            "Synthetic pair generated"
        );
        self.run_on(prices)
    }

    /// Stages 2 and 3: cointegration test, spread, z-score.
    #[instrument(skip_all, fields(steps = prices.len()))]
    pub fn prepare(&self, prices: &PricePair) -> Result<PreparedSpread, PipelineError> {
        if prices.s1.len() != prices.s2.len() {
            return Err(PipelineError::LengthMismatch {
                stage: "prices",
                expected: prices.s1.len(),
                actual: prices.s2.len(),
            });
        }
        if prices.is_empty() {
            return Err(PipelineError::EmptyInput("prices"));
        }

        let cointegration = self.tester.test(&prices.as_slices())?;
        let rank = cointegration.rank(self.config.significance);
        if rank == 0 {
            warn!(
                significance = ?self.config.significance,
                "Trace test does not reject 'no cointegration'; spread may not mean-revert"
            );
        }

        let weights = cointegration.weights();
        info!(weights = ?weights, rank = rank, "Using most significant weighting vector");

        let spread = compute_spread(&prices.legs(), weights)?;
        let zscores = compute_zscore(&spread, self.config.degenerate_policy)?;

        Ok(PreparedSpread {
            cointegration,
            spread,
            zscores,
        })
    }

    /// Run stages 2 through 5 on an existing pair.
    pub fn run_on(&self, prices: PricePair) -> Result<PipelineReport, PipelineError> {
        let PreparedSpread {
            cointegration,
            spread,
            zscores,
        } = self.prepare(&prices)?;

        let strategy = ZScoreThreshold::new(self.config.thresholds);
        let backtest = backtest::run(&strategy, &zscores, &spread)?;
        let diagnostics = diagnostics::analyze(&prices, &spread);

        Ok(PipelineReport {
            config: self.config.clone(),
            prices,
            cointegration,
            spread,
            zscores,
            backtest,
            diagnostics,
        })
    }
}
