//! Error types for the cointegration module

use thiserror::Error;

/// Errors that can occur while running a cointegration test
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CointegrationError {
    /// The procedure needs at least two series
    #[error("Cointegration test needs at least 2 series, got {0}")]
    TooFewSeries(usize),

    /// Critical value tables only cover a limited system size
    #[error("Critical values are tabulated for at most {max} series, got {actual}")]
    TooManySeries { max: usize, actual: usize },

    /// All series must share the same time index
    #[error("Series length mismatch: series 0 has {expected} points, series {index} has {actual}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Not enough observations for the requested lag structure
    #[error("Insufficient data: expected more than {expected} data points, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Lag order so large the required sample size overflows
    #[error("Lag order {0} is too large")]
    LagOrderTooLarge(usize),

    /// Only "no deterministic terms" (-1) and "constant" (0) are supported
    #[error("Unsupported deterministic trend order: {0} (use -1 or 0)")]
    UnsupportedTrendOrder(i32),

    /// Input contains NaN or infinity
    #[error("Series {0} contains non-finite values")]
    NonFinite(usize),

    /// Moment matrices are singular, e.g. collinear inputs
    #[error("Singular moment matrix: {0}")]
    Singular(&'static str),

    /// Eigenvalues outside [0, 1) or non-finite statistics
    #[error("Numerical failure: {0}")]
    Numerical(String),
}
