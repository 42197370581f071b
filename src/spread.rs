//! Spread and z-score computation.
//!
//! The spread is the weighted sum of contemporaneous prices; the z-score
//! normalizes it by the mean and unbiased standard deviation of the whole
//! sample (not a rolling window).

use crate::math::{mean, sample_std_dev};
use crate::types::{PriceSeries, SpreadSeries, ZScoreSeries};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A standard deviation within this many ulps of the spread's largest
/// magnitude is rounding noise, not variation.
const DEGENERATE_STD_ULPS: f64 = 16.0;

/// Errors from building the spread or its z-score
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpreadError {
    /// No series (or no points) were supplied
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Weighting vector does not have one coefficient per instrument
    #[error("Weight arity mismatch: {weights} weights for {series} series")]
    ArityMismatch { weights: usize, series: usize },

    /// Price legs differ in length
    #[error("Spread legs differ in length: expected {expected} points, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Spread has zero (or undefined) variance, so z-scores are undefined
    #[error("Degenerate spread: standard deviation {std_dev} over {len} points")]
    DegenerateSpread { std_dev: f64, len: usize },
}

/// What to do when the spread has zero variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Fail with `SpreadError::DegenerateSpread`
    #[default]
    Error,
    /// Emit NaN for every z-score; the signal machine then stays flat
    Nan,
}

impl std::str::FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "fail" => Ok(Self::Error),
            "nan" => Ok(Self::Nan),
            _ => Err(format!(
                "Unknown degenerate policy: '{}'. Use 'error' or 'nan'",
                s
            )),
        }
    }
}

/// `spread[t] = Σ weights[i] * prices[i][t]`
///
/// # Errors
/// - `EmptyInput` if no series are given
/// - `ArityMismatch` if `weights.len() != prices.len()`
/// - `LengthMismatch` if the series differ in length
pub fn compute_spread(
    prices: &[&PriceSeries],
    weights: &[f64],
) -> Result<SpreadSeries, SpreadError> {
    let first = prices.first().ok_or(SpreadError::EmptyInput("spread prices"))?;
    if weights.len() != prices.len() {
        return Err(SpreadError::ArityMismatch {
            weights: weights.len(),
            series: prices.len(),
        });
    }

    let len = first.len();
    if let Some(bad) = prices.iter().find(|p| p.len() != len) {
        return Err(SpreadError::LengthMismatch {
            expected: len,
            actual: bad.len(),
        });
    }

    let spread = (0..len)
        .map(|t| {
            prices
                .iter()
                .zip(weights)
                .map(|(series, w)| w * series.values()[t])
                .sum::<f64>()
        })
        .collect();

    Ok(SpreadSeries::new(spread))
}

/// `zscore[t] = (spread[t] - mean) / std_dev` over the full sample.
///
/// A standard deviation that is non-finite, undefined (fewer than two
/// points), or no larger than rounding noise at the spread's magnitude is
/// degenerate and handled per `policy`.
pub fn compute_zscore(
    spread: &SpreadSeries,
    policy: DegeneratePolicy,
) -> Result<ZScoreSeries, SpreadError> {
    let values = spread.values();
    let m = mean(values).ok_or(SpreadError::EmptyInput("spread"))?;
    let std_dev = sample_std_dev(values).unwrap_or(0.0);

    let magnitude = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = DEGENERATE_STD_ULPS * f64::EPSILON * magnitude;
    if !std_dev.is_finite() || std_dev <= tolerance {
        return match policy {
            DegeneratePolicy::Error => Err(SpreadError::DegenerateSpread {
                std_dev,
                len: values.len(),
            }),
            DegeneratePolicy::Nan => {
                warn!(
                    std_dev = std_dev,
                    len = values.len(),
                    "Zero-variance spread, emitting NaN z-scores"
                );
                Ok(ZScoreSeries::new(vec![f64::NAN; values.len()], m, std_dev))
            }
        };
    }

    debug!(mean = m, std_dev = std_dev, "Spread normalized");
    let scores = values.iter().map(|s| (s - m) / std_dev).collect();
    Ok(ZScoreSeries::new(scores, m, std_dev))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, values: &[f64]) -> PriceSeries {
        PriceSeries::new(name, values.to_vec())
    }

    #[test]
    fn test_weighted_spread() {
        let a = series("A", &[10.0, 11.0, 12.0]);
        let b = series("B", &[5.0, 5.0, 7.0]);
        let spread = compute_spread(&[&a, &b], &[1.0, -2.0]).unwrap();
        assert_eq!(spread.values(), &[0.0, 1.0, -2.0]);
    }

    #[test]
    fn test_arity_mismatch() {
        let a = series("A", &[1.0, 2.0]);
        let b = series("B", &[1.0, 2.0]);
        assert_eq!(
            compute_spread(&[&a, &b], &[1.0]),
            Err(SpreadError::ArityMismatch {
                weights: 1,
                series: 2
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        let a = series("A", &[1.0, 2.0, 3.0]);
        let b = series("B", &[1.0, 2.0]);
        assert!(matches!(
            compute_spread(&[&a, &b], &[1.0, -1.0]),
            Err(SpreadError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_empty_prices() {
        assert_eq!(
            compute_spread(&[], &[]),
            Err(SpreadError::EmptyInput("spread prices"))
        );
    }

    #[test]
    fn test_zscore_normalizes() {
        let spread = SpreadSeries::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let z = compute_zscore(&spread, DegeneratePolicy::Error).unwrap();
        assert_eq!(z.mean, 3.0);
        // Unbiased: Σ(x-3)² = 10, / 4
        assert!((z.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
        assert!((z.values()[0] + 2.0 / 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(z.values()[2], 0.0);
    }

    #[test]
    fn test_identical_legs_are_degenerate() {
        let a = series("A", &[100.0, 101.5, 99.0, 102.0]);
        let spread = compute_spread(&[&a, &a.clone()], &[1.0, -1.0]).unwrap();
        assert!(spread.values().iter().all(|&s| s == 0.0));

        assert!(matches!(
            compute_zscore(&spread, DegeneratePolicy::Error),
            Err(SpreadError::DegenerateSpread { len: 4, .. })
        ));

        let z = compute_zscore(&spread, DegeneratePolicy::Nan).unwrap();
        assert!(z.is_degenerate());
        assert_eq!(z.len(), 4);
    }

    #[test]
    fn test_small_variation_at_large_level_is_not_degenerate() {
        let spread = SpreadSeries::new(vec![1e6, 1e6 + 2e-7, 1e6 - 2e-7, 1e6]);
        let z = compute_zscore(&spread, DegeneratePolicy::Error).unwrap();
        assert!(z.std_dev > 0.0);
        assert!(z.values().iter().all(|v| v.is_finite()));
        assert!(z.values()[1] > 0.0 && z.values()[2] < 0.0);
    }

    #[test]
    fn test_rounding_noise_is_degenerate() {
        // One ulp of wobble around 1e6
        let ulp = 1e6 * f64::EPSILON;
        let spread = SpreadSeries::new(vec![1e6, 1e6 + ulp, 1e6, 1e6 + ulp]);
        assert!(matches!(
            compute_zscore(&spread, DegeneratePolicy::Error),
            Err(SpreadError::DegenerateSpread { len: 4, .. })
        ));
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let spread = SpreadSeries::new(vec![3.0]);
        assert!(matches!(
            compute_zscore(&spread, DegeneratePolicy::Error),
            Err(SpreadError::DegenerateSpread { len: 1, .. })
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("NaN".parse::<DegeneratePolicy>(), Ok(DegeneratePolicy::Nan));
        assert_eq!("error".parse::<DegeneratePolicy>(), Ok(DegeneratePolicy::Error));
        assert!("ignore".parse::<DegeneratePolicy>().is_err());
    }
}
