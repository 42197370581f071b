//! Spread diagnostics
//!
//! Secondary evidence that the chosen spread mean-reverts: correlation of
//! the legs, an ADF unit-root regression on the spread, and an
//! Ornstein-Uhlenbeck half-life estimate. These are reported next to the
//! Johansen result; they never change the trading signal.

use crate::math::{correlation, diff, mean};
use crate::types::{PricePair, SpreadSeries};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// ADF critical value at 5% significance level (MacKinnon, 1994)
/// For n > 100 samples, critical value ≈ -2.86
pub const ADF_CRITICAL_VALUE_5PCT: f64 = -2.86;

/// ADF needs at least this many points to be meaningful
const MIN_ADF_SAMPLES: usize = 20;

/// Lagged differences in the ADF regression
pub const ADF_LAGS: usize = 1;

/// Reported when the spread shows no mean reversion
const NON_STATIONARY_HALF_LIFE: f64 = f64::INFINITY;

/// Diagnostics computed on the final spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadDiagnostics {
    /// Pearson correlation of the two price legs
    pub leg_correlation: Option<f64>,
    /// ADF t-statistic on the spread (more negative = more stationary)
    pub adf_statistic: Option<f64>,
    /// ADF statistic below the 5% critical value
    pub adf_stationary: bool,
    /// Mean-reversion half-life in steps
    pub half_life_steps: f64,
}

/// Augmented Dickey-Fuller regression
/// `Δy[t] = α + γ y[t-1] + Σ_{i=1..p} δ_i Δy[t-i] + ε` with `p = lags`.
///
/// Returns the t-statistic of γ, or `None` when the sample is too short or
/// the regressors are collinear (e.g. a constant series).
pub fn adf_statistic(spread: &[f64], lags: usize) -> Option<f64> {
    if spread.len() < MIN_ADF_SAMPLES.max(lags + 3) {
        return None;
    }

    let delta = diff(spread);
    let rows = delta.len() - lags;
    // Intercept, lagged level, then one column per lagged difference
    let cols = 2 + lags;
    if rows <= cols {
        return None;
    }

    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let t = r + lags;
        match c {
            0 => 1.0,
            1 => spread[t],
            _ => delta[t - (c - 1)],
        }
    });
    let y = DVector::from_fn(rows, |r, _| delta[r + lags]);

    let xtx_inv = (x.transpose() * &x).try_inverse()?;
    let beta = &xtx_inv * x.transpose() * &y;
    let residuals = &y - &x * &beta;
    let sigma2 = residuals.norm_squared() / (rows - cols) as f64;

    let se_gamma = (sigma2 * xtx_inv[(1, 1)]).sqrt();
    if !se_gamma.is_finite() || se_gamma < f64::EPSILON {
        return None;
    }
    Some(beta[1] / se_gamma)
}

/// Half-life from lag-1 autocorrelation ρ: `-ln(2) / ln(ρ)`.
///
/// Infinite when ρ is outside (0, 1).
pub fn half_life(spread: &[f64]) -> f64 {
    let Some(m) = mean(spread) else {
        return NON_STATIONARY_HALF_LIFE;
    };
    if spread.len() < 3 {
        return NON_STATIONARY_HALF_LIFE;
    }

    let (mut num, mut den) = (0.0, 0.0);
    for w in spread.windows(2) {
        let dx = w[0] - m;
        num += dx * (w[1] - m);
        den += dx * dx;
    }
    if den == 0.0 {
        return NON_STATIONARY_HALF_LIFE;
    }

    let rho = num / den;
    if rho > 0.0 && rho < 1.0 {
        -std::f64::consts::LN_2 / rho.ln()
    } else {
        NON_STATIONARY_HALF_LIFE
    }
}

/// Run all spread diagnostics.
pub fn analyze(pair: &PricePair, spread: &SpreadSeries) -> SpreadDiagnostics {
    let leg_correlation = correlation(pair.s1.values(), pair.s2.values());
    let adf = adf_statistic(spread.values(), ADF_LAGS);
    let half_life_steps = half_life(spread.values());
    let adf_stationary = adf.is_some_and(|s| s < ADF_CRITICAL_VALUE_5PCT);

    debug!(adf = ?adf, lags = ADF_LAGS, critical = ADF_CRITICAL_VALUE_5PCT, "ADF on spread");
    info!(
        correlation = ?leg_correlation,
        adf_stationary = adf_stationary,
        half_life = format!("{:.1}", half_life_steps),
        "Spread diagnostics"
    );

    SpreadDiagnostics {
        leg_correlation,
        adf_statistic: adf,
        adf_stationary,
        half_life_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Distribution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use statrs::distribution::Normal;

    /// AR(1): y[t] = φ y[t-1] + ε, ε ~ N(0, 1)
    fn mean_reverting(n: usize, phi: f64) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut current = 10.0;
        (0..n)
            .map(|_| {
                current = phi * current + normal.sample(&mut rng);
                current
            })
            .collect()
    }

    #[test]
    fn test_adf_insufficient_data() {
        let spread: Vec<f64> = (0..15).map(|x| x as f64).collect();
        assert_eq!(adf_statistic(&spread, ADF_LAGS), None);
    }

    #[test]
    fn test_adf_constant_series() {
        assert_eq!(adf_statistic(&[5.0; 50], ADF_LAGS), None);
    }

    #[test]
    fn test_adf_mean_reverting_is_stationary() {
        let stat = adf_statistic(&mean_reverting(200, 0.3), ADF_LAGS).unwrap();
        assert!(
            stat < ADF_CRITICAL_VALUE_5PCT,
            "Mean-reverting series should reject unit root, got {:.2}",
            stat
        );
    }

    #[test]
    fn test_adf_random_walk_not_stationary() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let walk: Vec<f64> = (0..300)
            .scan(0.0, |level, _| {
                *level += normal.sample(&mut rng);
                Some(*level)
            })
            .collect();
        let stat = adf_statistic(&walk, ADF_LAGS).unwrap();
        assert!(stat > -4.0, "random walk statistic {:.2}", stat);
    }

    #[test]
    fn test_adf_lag_terms_change_regression() {
        let series = mean_reverting(200, 0.3);
        let plain = adf_statistic(&series, 0).unwrap();
        let augmented = adf_statistic(&series, 2).unwrap();
        assert!(plain < ADF_CRITICAL_VALUE_5PCT);
        assert!(augmented < ADF_CRITICAL_VALUE_5PCT);
        assert_ne!(plain, augmented);
        // Too few rows for the requested lags
        assert_eq!(adf_statistic(&series[..20], 20), None);
    }

    #[test]
    fn test_half_life() {
        // AR(1) with φ = 0.5 has half-life ≈ 1 step
        let hl = half_life(&mean_reverting(500, 0.5));
        assert!(hl > 0.3 && hl < 3.0, "half-life {}", hl);
        assert!(half_life(&[1.0, 1.0, 1.0]).is_infinite());
        assert!(half_life(&[]).is_infinite());
    }

    #[test]
    fn test_analyze_identical_legs() {
        let pair = PricePair {
            s1: crate::types::PriceSeries::new("S1", vec![1.0, 2.0, 3.0]),
            s2: crate::types::PriceSeries::new("S2", vec![1.0, 2.0, 3.0]),
        };
        let diag = analyze(&pair, &SpreadSeries::new(vec![0.0; 3]));
        assert!((diag.leg_correlation.unwrap() - 1.0).abs() < 1e-12);
        assert!(!diag.adf_stationary);
        assert!(diag.half_life_steps.is_infinite());
    }
}
