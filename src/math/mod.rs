//! Mathematical utilities for the pairs pipeline.
//!
//! This module provides the statistical primitives shared by the
//! spread computer, the diagnostics, and the backtest summary.

pub mod stats;

pub use stats::{correlation, diff, mean, sample_std_dev, sample_variance};
