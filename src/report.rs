//! Output files for a pipeline run.
//!
//! `results.csv` holds one row per step; `summary.json` the cointegration
//! test, diagnostics and backtest statistics; `sweep.json` the ranked
//! threshold grid.

use crate::backtest::{BacktestSummary, Trade};
use crate::cointegration::{CriticalValues, Significance};
use crate::diagnostics::SpreadDiagnostics;
use crate::pipeline::{PipelineConfig, PipelineReport, SweepResult};

use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const RESULTS_FILE: &str = "results.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const SWEEP_FILE: &str = "sweep.json";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error writing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build results table: {0}")]
    Polars(#[from] PolarsError),
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Cointegration part of the JSON summary
#[derive(Debug, Serialize)]
pub struct CointegrationSummary {
    pub weights: Vec<f64>,
    pub eigenvalues: Vec<f64>,
    pub trace_statistics: Vec<f64>,
    pub trace_critical_values: Vec<CriticalValues>,
    pub max_eigen_statistics: Vec<f64>,
    pub max_eigen_critical_values: Vec<CriticalValues>,
    pub observations: usize,
    pub significance: Significance,
    pub rank: usize,
}

/// JSON-serializable summary of one run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub config: PipelineConfig,
    pub cointegration: CointegrationSummary,
    pub spread_mean: f64,
    pub spread_std_dev: f64,
    pub diagnostics: SpreadDiagnostics,
    pub backtest: BacktestSummary,
    pub win_rate: f64,
    pub trades: Vec<Trade>,
}

impl RunSummary {
    pub fn from_report(report: &PipelineReport) -> Self {
        let coint = &report.cointegration;
        Self {
            config: report.config.clone(),
            cointegration: CointegrationSummary {
                weights: coint.weights().to_vec(),
                eigenvalues: coint.eigenvalues.clone(),
                trace_statistics: coint.trace_statistics.clone(),
                trace_critical_values: coint.trace_critical_values.clone(),
                max_eigen_statistics: coint.max_eigen_statistics.clone(),
                max_eigen_critical_values: coint.max_eigen_critical_values.clone(),
                observations: coint.observations,
                significance: report.config.significance,
                rank: report.cointegration_rank(),
            },
            spread_mean: report.zscores.mean,
            spread_std_dev: report.zscores.std_dev,
            diagnostics: report.diagnostics.clone(),
            backtest: report.backtest.summary.clone(),
            win_rate: report.backtest.summary.win_rate(),
            trades: report.backtest.trades.clone(),
        }
    }
}

/// Per-step table: `t, s1, s2, spread, zscore, position, pnl, cum_pnl`.
pub fn results_frame(report: &PipelineReport) -> PolarsResult<DataFrame> {
    let steps: Vec<i64> = (0..report.spread.len() as i64).collect();
    let positions: Vec<i32> = report
        .backtest
        .positions
        .directions()
        .into_iter()
        .map(i32::from)
        .collect();

    df! {
        "t" => steps,
        "s1" => report.prices.s1.values(),
        "s2" => report.prices.s2.values(),
        "spread" => report.spread.values(),
        "zscore" => report.zscores.values(),
        "position" => positions,
        "pnl" => report.backtest.pnl.pnl(),
        "cum_pnl" => report.backtest.pnl.cumulative()
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path).map_err(|e| io_error(path, e))?;
    file.write_all(json.as_bytes()).map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Write `results.csv` and `summary.json` under `output_dir`.
///
/// Returns the paths written.
pub fn write_run(report: &PipelineReport, output_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(output_dir).map_err(|e| io_error(output_dir, e))?;

    let csv_path = output_dir.join(RESULTS_FILE);
    let mut df = results_frame(report)?;
    let mut file = File::create(&csv_path).map_err(|e| io_error(&csv_path, e))?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    info!(path = %csv_path.display(), rows = df.height(), "Results written");

    let summary_path = output_dir.join(SUMMARY_FILE);
    write_json(&summary_path, &RunSummary::from_report(report))?;
    info!(path = %summary_path.display(), "Summary written");

    Ok(vec![csv_path, summary_path])
}

/// Write the ranked sweep results to `sweep.json` under `output_dir`.
pub fn write_sweep(results: &[SweepResult], output_dir: &Path) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(output_dir).map_err(|e| io_error(output_dir, e))?;
    let path = output_dir.join(SWEEP_FILE);
    write_json(&path, &results)?;
    info!(path = %path.display(), points = results.len(), "Sweep results written");
    Ok(path)
}
