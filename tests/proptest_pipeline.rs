//! Property-based tests for the pipeline stages
//!
//! These tests use proptest to verify invariants across many random inputs,
//! catching edge cases that unit tests might miss.

use proptest::prelude::*;
use statarb::backtest::simulate_pnl;
use statarb::generator::{generate_pair, GeneratorConfig};
use statarb::spread::{compute_spread, compute_zscore, DegeneratePolicy};
use statarb::strategy::ZScoreThreshold;
use statarb::types::{PositionSeries, PriceSeries, SpreadPosition, SpreadSeries, ZScoreSeries};

proptest! {
    /// Identical seeds reproduce identical series bit for bit
    #[test]
    fn generator_is_deterministic(seed in any::<u64>(), length in 1usize..200) {
        let config = GeneratorConfig { seed, length, ..Default::default() };
        let a = generate_pair(&config).unwrap();
        let b = generate_pair(&config).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Z-scores have zero mean and unit sample deviation
    #[test]
    fn zscore_is_standardized(
        values in prop::collection::vec(-1000.0f64..1000.0f64, 3..200)
    ) {
        let spread = SpreadSeries::new(values);
        if let Ok(z) = compute_zscore(&spread, DegeneratePolicy::Error) {
            let n = z.len() as f64;
            let mean = z.values().iter().sum::<f64>() / n;
            let var = z.values().iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            prop_assert!(mean.abs() < 1e-9, "mean {}", mean);
            prop_assert!((var - 1.0).abs() < 1e-6, "variance {}", var);
        }
    }

    /// Spread is the weighted sum of the legs at every step
    #[test]
    fn spread_is_weighted_sum(
        pairs in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..100),
        w0 in -2.0f64..2.0,
        w1 in -2.0f64..2.0
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let s1 = PriceSeries::new("S1", a.clone());
        let s2 = PriceSeries::new("S2", b.clone());
        let spread = compute_spread(&[&s1, &s2], &[w0, w1]).unwrap();
        for t in 0..a.len() {
            prop_assert_eq!(spread.values()[t], w0 * a[t] + w1 * b[t]);
        }
    }

    /// Long never turns short (or vice versa) without a flat step between
    #[test]
    fn no_direct_flip(
        z in prop::collection::vec(-4.0f64..4.0, 1..300),
        entry in 0.0f64..3.0,
        exit in 0.0f64..3.0
    ) {
        let positions = ZScoreThreshold::with_thresholds(entry, exit)
            .generate_positions(&ZScoreSeries::from_scores(z));
        for w in positions.directions().windows(2) {
            prop_assert!(w[0] * w[1] != -1, "direct flip {:?}", w);
        }
    }

    /// A strategy that is never in the market earns nothing
    #[test]
    fn flat_positions_earn_zero(
        values in prop::collection::vec(-100.0f64..100.0, 1..200)
    ) {
        let positions = PositionSeries::new(vec![SpreadPosition::Flat; values.len()]);
        let pnl = simulate_pnl(&positions, &SpreadSeries::new(values)).unwrap();
        prop_assert!(pnl.cumulative().iter().all(|&c| c == 0.0));
    }

    /// Cumulative P&L ends at the sum of the increments
    #[test]
    fn cumulative_matches_sum(
        steps in prop::collection::vec((-100.0f64..100.0, -1i8..=1), 1..200)
    ) {
        let spread: Vec<f64> = steps.iter().map(|(s, _)| *s).collect();
        let positions: Vec<SpreadPosition> = steps
            .iter()
            .map(|(_, d)| match d {
                1 => SpreadPosition::LongSpread,
                -1 => SpreadPosition::ShortSpread,
                _ => SpreadPosition::Flat,
            })
            .collect();
        let pnl = simulate_pnl(&PositionSeries::new(positions), &SpreadSeries::new(spread)).unwrap();
        prop_assert_eq!(pnl.pnl()[0], 0.0);
        let sum: f64 = pnl.pnl().iter().sum();
        prop_assert!((pnl.total() - sum).abs() < 1e-6);
    }
}
