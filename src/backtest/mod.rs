//! Backtesting engine for the spread strategy.
//!
//! P&L uses a one-step execution lag: a position decided on the z-score at
//! step t only earns the spread move from t to t+1.
//!
//! ```text
//! pnl[0] = 0
//! pnl[t] = position[t-1] * (spread[t] - spread[t-1])
//! ```

use crate::math::{mean, sample_std_dev};
use crate::strategy::Strategy;
use crate::types::{PnlSeries, PositionSeries, SpreadPosition, SpreadSeries, ZScoreSeries};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Periods per year for Sharpe annualization
const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Errors from marking positions against the spread
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Position series has {positions} steps but the spread has {spread}")]
    LengthMismatch { positions: usize, spread: usize },
}

/// Per-step P&L of holding `positions` against `spread`.
///
/// # Errors
/// Returns `LengthMismatch` if the two series differ in length.
pub fn simulate_pnl(
    positions: &PositionSeries,
    spread: &SpreadSeries,
) -> Result<PnlSeries, BacktestError> {
    if positions.len() != spread.len() {
        return Err(BacktestError::LengthMismatch {
            positions: positions.len(),
            spread: spread.len(),
        });
    }

    let s = spread.values();
    let p = positions.positions();
    let increments = (0..s.len())
        .map(|t| {
            if t == 0 {
                0.0
            } else {
                f64::from(p[t - 1].direction()) * (s[t] - s[t - 1])
            }
        })
        .collect();

    Ok(PnlSeries::from_increments(increments))
}

/// A round trip from entry to exit (or to the end of the series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub direction: SpreadPosition,
    /// Step whose z-score opened the position
    pub entry_step: usize,
    /// Step whose z-score closed it; `None` if still open at the end
    pub exit_step: Option<usize>,
    /// P&L accrued while the position was held
    pub pnl: f64,
}

/// Split the position stream into round-trip trades with their P&L.
pub fn extract_trades(positions: &PositionSeries, pnl: &PnlSeries) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut open: Option<Trade> = None;

    for (t, &position) in positions.positions().iter().enumerate() {
        // pnl[t] belongs to whatever was held after step t-1
        if let Some(trade) = open.as_mut() {
            trade.pnl += pnl.pnl().get(t).copied().unwrap_or(0.0);
        }

        let changed = open.as_ref().map(|trade| trade.direction) != Some(position);
        if !changed {
            continue;
        }
        if let Some(mut trade) = open.take() {
            trade.exit_step = Some(t);
            trades.push(trade);
        }
        if !position.is_flat() {
            open = Some(Trade {
                direction: position,
                entry_step: t,
                exit_step: None,
                pnl: 0.0,
            });
        }
    }

    trades.extend(open);
    trades
}

/// Headline statistics of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Final cumulative P&L (spread units)
    pub net_pnl: f64,
    /// Largest peak-to-trough decline of cumulative P&L
    pub max_drawdown: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// Fraction of steps with a non-flat position
    pub time_in_market: f64,
    /// Annualized Sharpe ratio of per-step P&L
    pub sharpe_ratio: f64,
}

impl BacktestSummary {
    pub fn from_run(positions: &PositionSeries, pnl: &PnlSeries, trades: &[Trade]) -> Self {
        let in_market = positions.positions().iter().filter(|p| !p.is_flat()).count();
        let time_in_market = if positions.is_empty() {
            0.0
        } else {
            in_market as f64 / positions.len() as f64
        };

        Self {
            net_pnl: pnl.total(),
            max_drawdown: max_drawdown(pnl.cumulative()),
            total_trades: trades.len() as u32,
            winning_trades: trades.iter().filter(|t| t.pnl > 0.0).count() as u32,
            losing_trades: trades.iter().filter(|t| t.pnl < 0.0).count() as u32,
            time_in_market,
            sharpe_ratio: sharpe_ratio(pnl.pnl().get(1..).unwrap_or(&[])),
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            0.0
        } else {
            self.winning_trades as f64 / self.total_trades as f64
        }
    }
}

/// Largest drop from a running peak (the peak starts at zero P&L).
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    cumulative
        .iter()
        .scan(0.0f64, |peak, &value| {
            *peak = peak.max(value);
            Some(*peak - value)
        })
        .fold(0.0, f64::max)
}

/// Annualized Sharpe ratio; 0 for fewer than two returns or zero volatility.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let (Some(m), Some(sd)) = (mean(returns), sample_std_dev(returns)) else {
        return 0.0;
    };
    if sd.abs() < f64::EPSILON {
        return 0.0;
    }
    (m / sd) * ANNUALIZATION_FACTOR.sqrt()
}

/// Everything produced by one backtest pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub positions: PositionSeries,
    pub pnl: PnlSeries,
    pub trades: Vec<Trade>,
    pub summary: BacktestSummary,
}

/// Run `strategy` over the z-scores and mark it against the spread.
///
/// # Errors
/// Returns `LengthMismatch` if the z-score and spread series differ in length.
pub fn run<S: Strategy>(
    strategy: &S,
    zscores: &ZScoreSeries,
    spread: &SpreadSeries,
) -> Result<BacktestResult, BacktestError> {
    let positions = strategy.generate_positions(zscores);
    let pnl = simulate_pnl(&positions, spread)?;
    let trades = extract_trades(&positions, &pnl);
    let summary = BacktestSummary::from_run(&positions, &pnl, &trades);

    info!(
        net_pnl = format!("{:.4}", summary.net_pnl),
        trades = summary.total_trades,
        max_drawdown = format!("{:.4}", summary.max_drawdown),
        "Backtest complete"
    );

    Ok(BacktestResult {
        positions,
        pnl,
        trades,
        summary,
    })
}
