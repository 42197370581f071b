//! Z-score threshold state machine.
//!
//! States and transitions, evaluated once per step in time order:
//!
//! ```text
//! Flat        --(z < -entry)-->  LongSpread
//! Flat        --(z > +entry)-->  ShortSpread
//! Long/Short  --(|z| < exit)-->  Flat
//! ```
//!
//! Anything else keeps the current state. A long position never turns
//! short (or vice versa) without first passing through `Flat`.
//!
//! The exit comparison is strict. With the default `exit = 0.0` it only
//! fires on an exact zero z-score, so positions are effectively held until
//! the end of the series.

use crate::types::{PositionSeries, SpreadPosition, ZScoreSeries};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Entry/exit thresholds in z-score units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Z-score threshold to enter a position (must be positive)
    #[serde(default = "default_entry_z")]
    pub entry_z: f64,
    /// Z-score threshold to exit a position (should be <= entry_z)
    #[serde(default = "default_exit_z")]
    pub exit_z: f64,
}

fn default_entry_z() -> f64 {
    1.0
}
fn default_exit_z() -> f64 {
    0.0
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            entry_z: default_entry_z(),
            exit_z: default_exit_z(),
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.entry_z.is_finite() || !self.exit_z.is_finite() {
            return Err(format!(
                "thresholds must be finite, got entry={} exit={}",
                self.entry_z, self.exit_z
            ));
        }
        Ok(())
    }

    /// `exit <= entry` is required for the machine to be well-behaved; it is
    /// reported, not enforced.
    pub fn is_well_ordered(&self) -> bool {
        self.exit_z <= self.entry_z
    }
}

/// Converts z-scores into spread positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreThreshold {
    config: ThresholdConfig,
}

impl ZScoreThreshold {
    pub fn new(config: ThresholdConfig) -> Self {
        if !config.is_well_ordered() {
            warn!(
                entry_z = config.entry_z,
                exit_z = config.exit_z,
                "Exit threshold above entry threshold; positions may open and close on the same signal band"
            );
        }
        Self { config }
    }

    pub fn with_thresholds(entry_z: f64, exit_z: f64) -> Self {
        Self::new(ThresholdConfig { entry_z, exit_z })
    }

    pub fn config(&self) -> ThresholdConfig {
        self.config
    }

    /// One transition of the state machine.
    pub fn next_position(&self, current: SpreadPosition, z: f64) -> SpreadPosition {
        let ThresholdConfig { entry_z, exit_z } = self.config;
        match current {
            SpreadPosition::Flat => {
                if z < -entry_z {
                    SpreadPosition::LongSpread
                } else if z > entry_z {
                    SpreadPosition::ShortSpread
                } else {
                    SpreadPosition::Flat
                }
            }
            SpreadPosition::LongSpread | SpreadPosition::ShortSpread => {
                if z.abs() < exit_z {
                    SpreadPosition::Flat
                } else {
                    current
                }
            }
        }
    }

    /// Scan the z-score stream in time order starting from `Flat`.
    pub fn generate_positions(&self, zscores: &ZScoreSeries) -> PositionSeries {
        let positions: Vec<SpreadPosition> = zscores
            .values()
            .iter()
            .scan(SpreadPosition::Flat, |state, &z| {
                *state = self.next_position(*state, z);
                Some(*state)
            })
            .collect();

        debug!(
            steps = positions.len(),
            in_market = positions.iter().filter(|p| !p.is_flat()).count(),
            "Positions generated"
        );
        PositionSeries::new(positions)
    }
}

impl Default for ZScoreThreshold {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpreadPosition::{Flat, LongSpread, ShortSpread};

    fn run(entry: f64, exit: f64, z: &[f64]) -> Vec<i8> {
        ZScoreThreshold::with_thresholds(entry, exit)
            .generate_positions(&ZScoreSeries::from_scores(z.to_vec()))
            .directions()
    }

    #[test]
    fn test_enters_short_and_holds_with_zero_exit() {
        assert_eq!(
            run(1.0, 0.0, &[1.5, 0.5, -1.5, -0.2, 0.1]),
            vec![-1, -1, -1, -1, -1]
        );
    }

    #[test]
    fn test_enters_long_below_negative_entry() {
        assert_eq!(run(1.0, 0.0, &[0.5, -1.2, -0.3]), vec![0, 1, 1]);
    }

    #[test]
    fn test_entry_is_strict() {
        assert_eq!(run(1.0, 0.0, &[1.0, -1.0, 0.0]), vec![0, 0, 0]);
    }

    #[test]
    fn test_exit_is_strict() {
        // |0.0| < 0.0 is false: an exact zero does not close the position
        assert_eq!(run(1.0, 0.0, &[2.0, 0.0]), vec![-1, -1]);
        assert_eq!(run(1.0, 0.5, &[2.0, 0.5, 0.49]), vec![-1, -1, 0]);
    }

    #[test]
    fn test_exit_then_reenter_opposite_side() {
        assert_eq!(
            run(1.0, 0.25, &[-1.5, -0.5, 0.1, 1.5, 0.9]),
            vec![1, 1, 0, -1, -1]
        );
    }

    #[test]
    fn test_no_direct_flip() {
        let machine = ZScoreThreshold::with_thresholds(1.0, 0.0);
        assert_eq!(machine.next_position(LongSpread, 5.0), LongSpread);
        assert_eq!(machine.next_position(ShortSpread, -5.0), ShortSpread);
        assert_eq!(machine.next_position(Flat, 0.3), Flat);
    }

    #[test]
    fn test_nan_scores_stay_flat() {
        assert_eq!(run(1.0, 0.0, &[f64::NAN; 4]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(run(1.0, 0.0, &[]).is_empty());
    }

    #[test]
    fn test_well_ordered() {
        assert!(ThresholdConfig::default().is_well_ordered());
        assert!(!ThresholdConfig {
            entry_z: 0.5,
            exit_z: 1.0
        }
        .is_well_ordered());
        assert!(ThresholdConfig {
            entry_z: f64::NAN,
            exit_z: 0.0
        }
        .validate()
        .is_err());
    }
}
