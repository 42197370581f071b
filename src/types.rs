//! Common Types Module
//!
//! Immutable series passed between pipeline stages. Each stage takes the
//! previous stage's output by reference and returns a new series; nothing is
//! mutated in place once constructed.

use serde::{Deserialize, Serialize};

/// Price history of a single instrument, one value per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    /// Instrument label used in reports (e.g., "S1")
    name: String,
    values: Vec<f64>,
}

impl PriceSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The two related instruments produced by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePair {
    pub s1: PriceSeries,
    pub s2: PriceSeries,
}

impl PricePair {
    /// Number of time steps (both legs have equal length by construction).
    pub fn len(&self) -> usize {
        self.s1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s1.is_empty()
    }

    /// Borrow both legs as raw slices, in instrument order.
    pub fn as_slices(&self) -> [&[f64]; 2] {
        [self.s1.values(), self.s2.values()]
    }

    pub fn legs(&self) -> [&PriceSeries; 2] {
        [&self.s1, &self.s2]
    }
}

/// Weighted combination of contemporaneous prices.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSeries(Vec<f64>);

impl SpreadSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Spread expressed in full-sample standard deviations from its mean.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreSeries {
    values: Vec<f64>,
    /// Full-sample mean of the spread the scores were derived from
    pub mean: f64,
    /// Unbiased (N-1) standard deviation of that spread
    pub std_dev: f64,
}

impl ZScoreSeries {
    pub fn new(values: Vec<f64>, mean: f64, std_dev: f64) -> Self {
        Self {
            values,
            mean,
            std_dev,
        }
    }

    /// Build a series directly from raw scores (mean 0, unit deviation).
    pub fn from_scores(values: Vec<f64>) -> Self {
        Self::new(values, 0.0, 1.0)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the scores are the NaN fallback for a zero-variance spread.
    pub fn is_degenerate(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|z| z.is_nan())
    }
}

/// Position held in the spread at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpreadPosition {
    /// No exposure
    #[default]
    Flat,
    /// Long the spread (spread expected to rise back to its mean)
    LongSpread,
    /// Short the spread (spread expected to fall back to its mean)
    ShortSpread,
}

impl SpreadPosition {
    /// Signed exposure: +1 long, -1 short, 0 flat.
    pub fn direction(self) -> i8 {
        match self {
            SpreadPosition::Flat => 0,
            SpreadPosition::LongSpread => 1,
            SpreadPosition::ShortSpread => -1,
        }
    }

    pub fn is_flat(self) -> bool {
        self == SpreadPosition::Flat
    }
}

impl std::fmt::Display for SpreadPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadPosition::Flat => write!(f, "flat"),
            SpreadPosition::LongSpread => write!(f, "long"),
            SpreadPosition::ShortSpread => write!(f, "short"),
        }
    }
}

/// Position after processing each step's z-score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSeries(Vec<SpreadPosition>);

impl PositionSeries {
    pub fn new(positions: Vec<SpreadPosition>) -> Self {
        Self(positions)
    }

    pub fn positions(&self) -> &[SpreadPosition] {
        &self.0
    }

    /// Signed exposures, one per step.
    pub fn directions(&self) -> Vec<i8> {
        self.0.iter().map(|p| p.direction()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-step and cumulative profit and loss in spread units.
#[derive(Debug, Clone, PartialEq)]
pub struct PnlSeries {
    pnl: Vec<f64>,
    cumulative: Vec<f64>,
}

impl PnlSeries {
    /// Build from per-step P&L; the cumulative curve is the running sum.
    pub fn from_increments(pnl: Vec<f64>) -> Self {
        let cumulative = pnl
            .iter()
            .scan(0.0, |acc, x| {
                *acc += x;
                Some(*acc)
            })
            .collect();
        Self { pnl, cumulative }
    }

    pub fn pnl(&self) -> &[f64] {
        &self.pnl
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Final value of the cumulative curve (0 for an empty series).
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.pnl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pnl.is_empty()
    }
}
