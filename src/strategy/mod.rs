pub mod zscore_threshold;

pub use zscore_threshold::{ThresholdConfig, ZScoreThreshold};

use crate::types::{PositionSeries, ZScoreSeries};

/// Strategy trait contract for the backtest.
pub trait Strategy {
    /// Given the z-score stream, produce one position per step, aligned with
    /// the input (same length). The position at step t is the state after
    /// observing `zscores[t]`.
    fn generate_positions(&self, zscores: &ZScoreSeries) -> PositionSeries;
}

impl Strategy for ZScoreThreshold {
    fn generate_positions(&self, zscores: &ZScoreSeries) -> PositionSeries {
        ZScoreThreshold::generate_positions(self, zscores)
    }
}
