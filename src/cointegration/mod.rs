//! Cointegration testing
//!
//! The pipeline consumes cointegration tests through the
//! [`CointegrationTester`] trait: aligned series in, ranked weighting
//! vectors and test statistics out. [`Johansen`] is the bundled
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use statarb::cointegration::{CointegrationTester, Johansen};
//!
//! let tester = Johansen::new(-1, 1)?;
//! let result = tester.test(&[&s1, &s2])?;
//! let weights = result.weights();
//! ```

pub mod critical_values;
pub mod error;
pub mod johansen;

pub use error::CointegrationError;
pub use johansen::Johansen;

use serde::{Deserialize, Serialize};

/// Deterministic terms included in the test regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeterministicTerm {
    /// No constant, no trend (order -1)
    None,
    /// Constant term, data demeaned (order 0)
    Constant,
}

impl DeterministicTerm {
    /// Numeric trend order as used by conventional test interfaces.
    pub fn order(self) -> i32 {
        match self {
            DeterministicTerm::None => -1,
            DeterministicTerm::Constant => 0,
        }
    }
}

impl TryFrom<i32> for DeterministicTerm {
    type Error = CointegrationError;

    fn try_from(order: i32) -> Result<Self, Self::Error> {
        match order {
            -1 => Ok(DeterministicTerm::None),
            0 => Ok(DeterministicTerm::Constant),
            other => Err(CointegrationError::UnsupportedTrendOrder(other)),
        }
    }
}

/// Confidence level for reading the critical value tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    P90,
    P95,
    P99,
}

impl std::str::FromStr for Significance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('%') {
            "90" => Ok(Self::P90),
            "95" => Ok(Self::P95),
            "99" => Ok(Self::P99),
            _ => Err(format!(
                "Unknown significance level: '{}'. Use 90, 95 or 99",
                s
            )),
        }
    }
}

/// Critical values at the three standard confidence levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl CriticalValues {
    pub fn at(&self, level: Significance) -> f64 {
        match level {
            Significance::P90 => self.p90,
            Significance::P95 => self.p95,
            Significance::P99 => self.p99,
        }
    }
}

/// Output of a cointegration test over `n` series.
///
/// Entry `r` of each statistics vector tests the null hypothesis
/// "cointegration rank <= r". Eigenvectors are ranked by eigenvalue,
/// most significant first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CointegrationResult {
    /// Eigenvalues, descending
    pub eigenvalues: Vec<f64>,
    /// Candidate weighting vectors, one per eigenvalue, each of length `n`
    pub eigenvectors: Vec<Vec<f64>>,
    /// Trace statistics, one per null rank
    pub trace_statistics: Vec<f64>,
    /// Maximum-eigenvalue statistics, one per null rank
    pub max_eigen_statistics: Vec<f64>,
    /// Critical values matching `trace_statistics`
    pub trace_critical_values: Vec<CriticalValues>,
    /// Critical values matching `max_eigen_statistics`
    pub max_eigen_critical_values: Vec<CriticalValues>,
    /// Effective sample size used by the regression
    pub observations: usize,
}

impl CointegrationResult {
    /// Number of series the test was run on.
    pub fn series_count(&self) -> usize {
        self.eigenvalues.len()
    }

    /// The most significant weighting vector.
    pub fn weights(&self) -> &[f64] {
        self.eigenvectors.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cointegration rank implied by the sequential trace test: the number
    /// of leading null hypotheses rejected at `level`.
    pub fn rank(&self, level: Significance) -> usize {
        self.trace_statistics
            .iter()
            .zip(&self.trace_critical_values)
            .take_while(|(stat, cv)| **stat > cv.at(level))
            .count()
    }

    /// True when the trace test rejects "no cointegration" at `level`.
    pub fn is_cointegrated(&self, level: Significance) -> bool {
        self.rank(level) > 0
    }
}

/// A cointegration test over aligned series.
pub trait CointegrationTester {
    /// Run the test. `series` are aligned by time index; all must have
    /// the same length.
    fn test(&self, series: &[&[f64]]) -> Result<CointegrationResult, CointegrationError>;
}
