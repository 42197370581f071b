//! Grid search over entry/exit thresholds
//!
//! The cointegration test and z-score do not depend on the thresholds, so
//! they are computed once and every grid point only reruns stages 4 and 5.

use super::{Pipeline, PipelineError, PreparedSpread};
use crate::backtest::{self, BacktestSummary};
use crate::cointegration::CointegrationTester;
use crate::strategy::ZScoreThreshold;
use crate::types::PricePair;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Threshold grid to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchConfig {
    /// Z-score entry thresholds to test
    pub entries: Vec<f64>,
    /// Z-score exit thresholds to test
    pub exits: Vec<f64>,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            entries: (5..=25).step_by(5).map(|i| i as f64 / 10.0).collect(),
            exits: vec![0.0, 0.25, 0.5],
        }
    }
}

impl GridSearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.entries.is_empty() || self.exits.is_empty() {
            return Err("sweep grid needs at least one entry and one exit value".to_string());
        }
        if let Some(bad) = self.entries.iter().chain(&self.exits).find(|v| !v.is_finite()) {
            return Err(format!("sweep thresholds must be finite, got {}", bad));
        }
        Ok(())
    }

    /// Number of (entry, exit) combinations with `exit <= entry`.
    pub fn valid_combinations(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| self.exits.iter().filter(|&exit| exit <= entry).count())
            .sum()
    }
}

/// Outcome of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub entry_z: f64,
    pub exit_z: f64,
    pub summary: BacktestSummary,
}

/// Backtest every well-ordered threshold pair on one prepared spread.
///
/// Results are sorted by net P&L, best first. Pairs with `exit > entry` are
/// skipped.
pub fn sweep_thresholds(
    prepared: &PreparedSpread,
    grid: &GridSearchConfig,
) -> Result<Vec<SweepResult>, PipelineError> {
    grid.validate().map_err(PipelineError::InvalidConfig)?;

    let mut results = Vec::with_capacity(grid.valid_combinations());
    for &entry_z in &grid.entries {
        for &exit_z in &grid.exits {
            if exit_z > entry_z {
                warn!(entry_z, exit_z, "Skipping grid point with exit above entry");
                continue;
            }

            let strategy = ZScoreThreshold::with_thresholds(entry_z, exit_z);
            let result = backtest::run(&strategy, &prepared.zscores, &prepared.spread)?;
            debug!(
                entry_z,
                exit_z,
                net_pnl = result.summary.net_pnl,
                trades = result.summary.total_trades,
                "Grid point evaluated"
            );
            results.push(SweepResult {
                entry_z,
                exit_z,
                summary: result.summary,
            });
        }
    }

    results.sort_by(|a, b| {
        b.summary
            .net_pnl
            .partial_cmp(&a.summary.net_pnl)
            .unwrap_or(Ordering::Equal)
    });

    if let Some(best) = results.first() {
        info!(
            evaluated = results.len(),
            best_entry = best.entry_z,
            best_exit = best.exit_z,
            best_pnl = format!("{:.4}", best.summary.net_pnl),
            "Threshold sweep complete"
        );
    }
    Ok(results)
}

/// Prepare the spread of `prices` once, then sweep the grid over it.
pub fn run_sweep<T: CointegrationTester>(
    pipeline: &Pipeline<T>,
    prices: &PricePair,
    grid: &GridSearchConfig,
) -> Result<Vec<SweepResult>, PipelineError> {
    let prepared = pipeline.prepare(prices)?;
    sweep_thresholds(&prepared, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cointegration::{CointegrationResult, CriticalValues};
    use crate::types::{SpreadSeries, ZScoreSeries};

    fn prepared(z: Vec<f64>, spread: Vec<f64>) -> PreparedSpread {
        let cv = CriticalValues {
            p90: 1.0,
            p95: 2.0,
            p99: 3.0,
        };
        PreparedSpread {
            cointegration: CointegrationResult {
                eigenvalues: vec![0.1, 0.0],
                eigenvectors: vec![vec![1.0, -1.0], vec![0.0, 1.0]],
                trace_statistics: vec![0.0, 0.0],
                max_eigen_statistics: vec![0.0, 0.0],
                trace_critical_values: vec![cv; 2],
                max_eigen_critical_values: vec![cv; 2],
                observations: spread.len(),
            },
            spread: SpreadSeries::new(spread),
            zscores: ZScoreSeries::from_scores(z),
        }
    }

    #[test]
    fn test_skips_exit_above_entry() {
        let grid = GridSearchConfig {
            entries: vec![0.5, 1.0],
            exits: vec![0.0, 0.75],
        };
        assert_eq!(grid.valid_combinations(), 3);

        let p = prepared(vec![0.0, -1.2, 0.1, 0.9], vec![0.0, -1.0, 0.0, 1.0]);
        let results = sweep_thresholds(&p, &grid).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.exit_z <= r.entry_z));
    }

    #[test]
    fn test_sorted_by_net_pnl() {
        // Long entered at step 1 earns the rise; a tight exit gives some back
        let p = prepared(
            vec![0.0, -1.5, -0.2, 0.1, 0.4],
            vec![0.0, -2.0, -0.5, 0.5, 1.0],
        );
        let grid = GridSearchConfig {
            entries: vec![1.0, 2.0],
            exits: vec![0.0, 0.3],
        };
        let results = sweep_thresholds(&p, &grid).unwrap();
        assert_eq!(results.len(), 4);
        for pair in results.windows(2) {
            assert!(pair[0].summary.net_pnl >= pair[1].summary.net_pnl);
        }
        assert_eq!(results[0].entry_z, 1.0);
        assert_eq!(results[0].exit_z, 0.0);
        assert_eq!(results[0].summary.net_pnl, 3.0);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let p = prepared(vec![0.0], vec![0.0]);
        let grid = GridSearchConfig {
            entries: vec![],
            exits: vec![0.0],
        };
        assert!(matches!(
            sweep_thresholds(&p, &grid),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_grid() {
        let grid = GridSearchConfig::default();
        assert_eq!(grid.entries, vec![0.5, 1.0, 1.5, 2.0, 2.5]);
        assert!(grid.validate().is_ok());
        // exit 0.5 <= every entry; all 15 points are valid
        assert_eq!(grid.valid_combinations(), 15);
    }
}
