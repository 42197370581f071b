pub mod backtest;
pub mod cli;
pub mod cointegration;
pub mod commands;
pub mod diagnostics;
pub mod generator;
pub mod math;
pub mod pipeline;
pub mod report;
pub mod spread;
pub mod strategy;
pub mod types;
