//! Johansen cointegration test
//!
//! Reduced-rank regression of the VECM
//!
//! ```text
//! ΔY[t] = Π Y[t-1] + Σ_{i=1..k} Γ_i ΔY[t-i] + ε[t]
//! ```
//!
//! 1. Regress ΔY[t] and the lagged levels on the k lagged differences,
//!    keeping residuals R0 and Rk.
//! 2. Form moment matrices S00, S0k, Skk from the residuals.
//! 3. Solve `Sk0 S00⁻¹ S0k v = λ Skk v` through the Cholesky factor of Skk.
//! 4. trace[r] = -T Σ_{i>=r} ln(1 - λ_i), maxeig[r] = -T ln(1 - λ_r).
//!
//! Eigenvectors are normalized so `vᵀ Skk v = 1`, and the whole matrix is
//! sign-flipped so its first non-zero entry (row-major) is positive.

use super::critical_values::{self, MAX_SERIES};
use super::{CointegrationError, CointegrationResult, CointegrationTester, DeterministicTerm};

use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Smallest admissible Cholesky pivot relative to the largest diagonal entry.
/// Below this the moment matrix is treated as singular (collinear inputs).
const COLLINEARITY_TOLERANCE: f64 = 1e-10;

/// Eigenvalues this close below zero are rounding noise.
const EIGENVALUE_FLOOR: f64 = -1e-10;

/// Johansen trace / max-eigenvalue test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Johansen {
    term: DeterministicTerm,
    lag_diffs: usize,
}

impl Johansen {
    /// Create a tester from a numeric trend order (-1 none, 0 constant) and
    /// the number of lagged differences in the VECM.
    ///
    /// # Errors
    /// Returns `UnsupportedTrendOrder` for any other order.
    pub fn new(det_order: i32, lag_diffs: usize) -> Result<Self, CointegrationError> {
        Ok(Self::with_term(DeterministicTerm::try_from(det_order)?, lag_diffs))
    }

    pub fn with_term(term: DeterministicTerm, lag_diffs: usize) -> Self {
        Self { term, lag_diffs }
    }

    pub fn term(&self) -> DeterministicTerm {
        self.term
    }

    pub fn lag_diffs(&self) -> usize {
        self.lag_diffs
    }

    fn validate_input(&self, series: &[&[f64]]) -> Result<usize, CointegrationError> {
        let neqs = series.len();
        if neqs < 2 {
            return Err(CointegrationError::TooFewSeries(neqs));
        }
        if neqs > MAX_SERIES {
            return Err(CointegrationError::TooManySeries {
                max: MAX_SERIES,
                actual: neqs,
            });
        }

        let nobs = series[0].len();
        for (index, s) in series.iter().enumerate() {
            if s.len() != nobs {
                return Err(CointegrationError::LengthMismatch {
                    index,
                    expected: nobs,
                    actual: s.len(),
                });
            }
            if s.iter().any(|v| !v.is_finite()) {
                return Err(CointegrationError::NonFinite(index));
            }
        }

        // Effective rows (nobs - 1 - k) must exceed the regressor count
        let min_obs = self
            .lag_diffs
            .checked_add(1)
            .and_then(|lags| neqs.checked_mul(lags))
            .and_then(|regressors| regressors.checked_add(self.lag_diffs))
            .and_then(|n| n.checked_add(1))
            .ok_or(CointegrationError::LagOrderTooLarge(self.lag_diffs))?;
        if nobs <= min_obs {
            return Err(CointegrationError::InsufficientData {
                expected: min_obs,
                actual: nobs,
            });
        }
        Ok(nobs)
    }
}

impl Default for Johansen {
    fn default() -> Self {
        Self::with_term(DeterministicTerm::None, 1)
    }
}

fn demean_columns(m: &mut DMatrix<f64>) {
    if m.nrows() == 0 {
        return;
    }
    for j in 0..m.ncols() {
        let mean = m.column(j).mean();
        for i in 0..m.nrows() {
            m[(i, j)] -= mean;
        }
    }
}

/// Residuals of the least-squares regression of `y` on `z`.
fn residualize(y: &DMatrix<f64>, z: &DMatrix<f64>) -> Result<DMatrix<f64>, CointegrationError> {
    if z.ncols() == 0 {
        return Ok(y.clone());
    }
    let svd = z.clone().svd(true, true);
    let tolerance =
        svd.singular_values.max() * f64::EPSILON * z.nrows().max(z.ncols()) as f64;
    let pinv = svd
        .pseudo_inverse(tolerance)
        .map_err(|_| CointegrationError::Singular("lagged differences"))?;
    let coefficients = pinv * y;
    Ok(y - z * coefficients)
}

/// Inverse of the lower Cholesky factor of a symmetric positive-definite
/// moment matrix, rejecting near-zero pivots.
fn inverse_cholesky_factor(
    m: DMatrix<f64>,
    what: &'static str,
) -> Result<DMatrix<f64>, CointegrationError> {
    let scale = m.diagonal().max();
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CointegrationError::Singular(what));
    }
    let l = Cholesky::new(m)
        .ok_or(CointegrationError::Singular(what))?
        .l();
    let floor = scale * COLLINEARITY_TOLERANCE;
    if l.diagonal().iter().any(|d| d * d <= floor) {
        return Err(CointegrationError::Singular(what));
    }
    l.try_inverse().ok_or(CointegrationError::Singular(what))
}

impl CointegrationTester for Johansen {
    fn test(&self, series: &[&[f64]]) -> Result<CointegrationResult, CointegrationError> {
        let nobs = self.validate_input(series)?;
        let neqs = series.len();
        let k = self.lag_diffs;
        let rows = nobs - 1 - k;

        let levels = DMatrix::from_fn(nobs, neqs, |t, j| series[j][t]);
        let diffs = DMatrix::from_fn(nobs - 1, neqs, |t, j| levels[(t + 1, j)] - levels[(t, j)]);

        // Column block `lag - 1` holds ΔY[t - lag]
        let mut lagged = DMatrix::from_fn(rows, neqs * k, |t, c| {
            let lag = c / neqs + 1;
            diffs[(k + t - lag, c % neqs)]
        });
        let mut current = diffs.rows(k, rows).into_owned();
        let mut lagged_levels = levels.rows(1, rows).into_owned();

        if self.term == DeterministicTerm::Constant {
            demean_columns(&mut lagged);
            demean_columns(&mut current);
            demean_columns(&mut lagged_levels);
        }

        let r0 = residualize(&current, &lagged)?;
        let rk = residualize(&lagged_levels, &lagged)?;

        let t = rows as f64;
        let skk = rk.transpose() * &rk / t;
        let sk0 = rk.transpose() * &r0 / t;
        let s00 = r0.transpose() * &r0 / t;

        // S00⁻¹ = L⁻ᵀ L⁻¹
        let l00_inv = inverse_cholesky_factor(s00, "S00")?;
        let s00_inv = l00_inv.transpose() * &l00_inv;
        let sig = &sk0 * s00_inv * sk0.transpose();

        let l_inv = inverse_cholesky_factor(skk, "Skk")?;

        let sym = &l_inv * sig * l_inv.transpose();
        let sym = (&sym + sym.transpose()) * 0.5;
        let eigen = SymmetricEigen::new(sym);
        let vectors = l_inv.transpose() * eigen.eigenvectors;

        let mut order: Vec<usize> = (0..neqs).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut eigenvalues = Vec::with_capacity(neqs);
        for &i in &order {
            let lambda = eigen.eigenvalues[i];
            if !lambda.is_finite() || lambda < EIGENVALUE_FLOOR || lambda >= 1.0 {
                return Err(CointegrationError::Numerical(format!(
                    "eigenvalue {lambda} outside [0, 1)"
                )));
            }
            eigenvalues.push(lambda.max(0.0));
        }

        let mut ranked = DMatrix::from_fn(neqs, neqs, |r, c| vectors[(r, order[c])]);
        let first_nonzero = (0..neqs)
            .flat_map(|r| (0..neqs).map(move |c| (r, c)))
            .map(|idx| ranked[idx])
            .find(|v| *v != 0.0);
        if matches!(first_nonzero, Some(v) if v < 0.0) {
            ranked = -ranked;
        }

        let trace_statistics: Vec<f64> = (0..neqs)
            .map(|r| -t * eigenvalues[r..].iter().map(|l| (1.0 - l).ln()).sum::<f64>())
            .collect();
        let max_eigen_statistics: Vec<f64> =
            eigenvalues.iter().map(|l| -t * (1.0 - l).ln()).collect();

        let too_many = || CointegrationError::TooManySeries {
            max: MAX_SERIES,
            actual: neqs,
        };
        let trace_critical_values = (0..neqs)
            .map(|r| critical_values::trace(self.term, neqs - r).ok_or_else(too_many))
            .collect::<Result<Vec<_>, _>>()?;
        let max_eigen_critical_values = (0..neqs)
            .map(|r| critical_values::max_eigen(self.term, neqs - r).ok_or_else(too_many))
            .collect::<Result<Vec<_>, _>>()?;

        let eigenvectors: Vec<Vec<f64>> = (0..neqs)
            .map(|c| ranked.column(c).iter().copied().collect())
            .collect();

        debug!(
            eigenvalues = ?eigenvalues,
            trace = ?trace_statistics,
            "Johansen eigenproblem solved"
        );
        info!(
            series = neqs,
            observations = rows,
            trend_order = self.term.order(),
            lag_diffs = k,
            trace_r0 = format!("{:.3}", trace_statistics[0]),
            cv95_r0 = trace_critical_values[0].p95,
            "Johansen test complete"
        );

        Ok(CointegrationResult {
            eigenvalues,
            eigenvectors,
            trace_statistics,
            max_eigen_statistics,
            trace_critical_values,
            max_eigen_critical_values,
            observations: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cointegration::Significance;
    use crate::generator::{generate_pair, GeneratorConfig};

    fn default_pair() -> (Vec<f64>, Vec<f64>) {
        let pair = generate_pair(&GeneratorConfig::default()).unwrap();
        (pair.s1.values().to_vec(), pair.s2.values().to_vec())
    }

    #[test]
    fn test_detects_synthetic_cointegration() {
        let (s1, s2) = default_pair();
        let result = Johansen::default().test(&[&s1, &s2]).unwrap();

        assert_eq!(result.series_count(), 2);
        assert!(result.is_cointegrated(Significance::P95));
        assert!(result.trace_statistics[0] > result.trace_critical_values[0].p99);

        // Spread ∝ S2 - 0.5 * S1, first weight normalized positive
        let w = result.weights();
        assert!(w[0] > 0.0);
        let implied_beta = -w[0] / w[1];
        assert!(
            (implied_beta - 0.5).abs() < 0.05,
            "implied hedge ratio {}",
            implied_beta
        );
    }

    #[test]
    fn test_constant_term_also_detects() {
        let (s1, s2) = default_pair();
        let result = Johansen::new(0, 1).unwrap().test(&[&s1, &s2]).unwrap();
        assert!(result.is_cointegrated(Significance::P95));
        assert_eq!(result.trace_critical_values[0].p95, 15.4943);
    }

    #[test]
    fn test_statistics_are_consistent() {
        let (s1, s2) = default_pair();
        let result = Johansen::with_term(DeterministicTerm::None, 2)
            .test(&[&s1, &s2])
            .unwrap();

        assert!(result.eigenvalues[0] >= result.eigenvalues[1]);
        assert!(result.eigenvalues.iter().all(|l| (0.0..1.0).contains(l)));
        // Trace for r=0 sums both max-eigen terms
        let sum = result.max_eigen_statistics.iter().sum::<f64>();
        assert!((result.trace_statistics[0] - sum).abs() < 1e-9);
        assert!((result.trace_statistics[1] - result.max_eigen_statistics[1]).abs() < 1e-9);
        assert_eq!(result.observations, s1.len() - 3);
    }

    #[test]
    fn test_no_lagged_differences() {
        let (s1, s2) = default_pair();
        let result = Johansen::new(-1, 0).unwrap().test(&[&s1, &s2]).unwrap();
        assert_eq!(result.observations, s1.len() - 1);
        assert!(result.trace_statistics.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_identical_series_are_singular() {
        let (s1, _) = default_pair();
        let err = Johansen::default().test(&[&s1, &s1]).unwrap_err();
        assert!(matches!(err, CointegrationError::Singular(_)), "{err:?}");
    }

    #[test]
    fn test_too_short_sample() {
        let a = [1.0, 2.0, 3.0, 2.5, 2.0];
        let b = [2.0, 1.0, 3.0, 4.0, 2.0];
        assert!(matches!(
            Johansen::default().test(&[&a, &b]),
            Err(CointegrationError::InsufficientData { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_huge_lag_order_rejected() {
        let (s1, s2) = default_pair();
        assert_eq!(
            Johansen::new(-1, usize::MAX).unwrap().test(&[&s1, &s2]),
            Err(CointegrationError::LagOrderTooLarge(usize::MAX))
        );
        // Fits in usize but still needs more data than any real sample
        assert!(matches!(
            Johansen::new(-1, usize::MAX / 4).unwrap().test(&[&s1, &s2]),
            Err(CointegrationError::InsufficientData { actual: 500, .. })
        ));
    }

    #[test]
    fn test_input_validation() {
        let a = vec![1.0; 50];
        let b = vec![1.0; 49];
        assert!(matches!(
            Johansen::default().test(&[&a, &b]),
            Err(CointegrationError::LengthMismatch { index: 1, .. })
        ));
        assert_eq!(
            Johansen::default().test(&[&a]),
            Err(CointegrationError::TooFewSeries(1))
        );
        let mut c = vec![1.0; 50];
        c[10] = f64::NAN;
        assert_eq!(
            Johansen::default().test(&[&a, &c]),
            Err(CointegrationError::NonFinite(1))
        );
        assert_eq!(
            Johansen::new(1, 1),
            Err(CointegrationError::UnsupportedTrendOrder(1))
        );
    }
}
