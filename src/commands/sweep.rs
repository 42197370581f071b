//! Sweep command handler.

use crate::cli::SweepCliConfig;
use crate::generator::generate_pair;
use crate::pipeline::{run_sweep, Pipeline};
use crate::report;

use tracing::info;

/// Number of grid points echoed to the log
const TOP_RESULTS: usize = 5;

/// Backtest the threshold grid on the configured pair and write `sweep.json`.
///
/// # Errors
/// Returns error if generation, the cointegration test, or output fails.
pub fn run_threshold_sweep(config: SweepCliConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("--- Running Threshold Sweep ---");
    info!(
        entries = ?config.grid.entries,
        exits = ?config.grid.exits,
        points = config.grid.valid_combinations(),
        "Sweep grid"
    );

    let pipeline = Pipeline::from_config(config.run.pipeline.clone())?;
    let prices = generate_pair(&pipeline.config().generator)?;
    let results = run_sweep(&pipeline, &prices, &config.grid)?;

    info!("--- Top Thresholds ---");
    for (i, r) in results.iter().take(TOP_RESULTS).enumerate() {
        info!(
            "{}. entry={:.2} exit={:.2} net_pnl={:.4} trades={} sharpe={:.2}",
            i + 1,
            r.entry_z,
            r.exit_z,
            r.summary.net_pnl,
            r.summary.total_trades,
            r.summary.sharpe_ratio
        );
    }

    report::write_sweep(&results, &config.run.output_dir)?;
    Ok(())
}
