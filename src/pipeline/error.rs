//! Error types for the analysis pipeline

use crate::backtest::BacktestError;
use crate::cointegration::CointegrationError;
use crate::generator::GeneratorError;
use crate::spread::SpreadError;
use thiserror::Error;

/// Errors that can occur while running the pairs pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Invalid generator parameters
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// The cointegration test failed (collinear or too-short input)
    #[error("Cointegration test failed: {0}")]
    Cointegration(#[from] CointegrationError),

    /// The price pair is empty
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// The price legs differ in length
    #[error("Length mismatch in {stage}: expected {expected} points, got {actual}")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Spread or z-score could not be formed
    #[error("Spread error: {0}")]
    Spread(#[from] SpreadError),

    /// Positions could not be marked against the spread
    #[error("Backtest error: {0}")]
    Backtest(#[from] BacktestError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
