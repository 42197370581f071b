//! Descriptive statistics over `f64` slices.
//!
//! All functions return `None` instead of NaN when the statistic is
//! undefined for the given sample size.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (N-1 denominator). `None` when N < 2.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some(ss / (values.len() as f64 - 1.0))
}

/// Unbiased sample standard deviation. `None` when N < 2.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Pearson correlation coefficient between two equal-length series
///
/// Returns a value in [-1.0, 1.0], `Some(0.0)` when either series is
/// constant, or `None` if lengths differ or fewer than two points exist.
///
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return Some(0.0);
    }

    let r = covariance / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then_some(r)
}

/// First differences: `out[i] = values[i + 1] - values[i]`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_sample_std() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&xs), Some(5.0));
        // Σ(x-5)² = 32, / 7
        let var = sample_variance(&xs).unwrap();
        assert!((var - 32.0 / 7.0).abs() < 1e-12);
        assert!((sample_std_dev(&xs).unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_for_small_samples() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_variance(&[1.0]), None);
        assert_eq!(sample_std_dev(&[]), None);
    }

    #[test]
    fn test_correlation_perfect() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let corr = correlation(&a, &a).unwrap();
        assert!((corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_negative() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        let corr = correlation(&a, &b).unwrap();
        assert!((corr + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_constant_and_mismatch() {
        assert_eq!(correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), Some(0.0));
        assert_eq!(correlation(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 3.0, 2.0]), vec![2.0, -1.0]);
        assert!(diff(&[1.0]).is_empty());
    }
}
