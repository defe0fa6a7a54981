//! Utility functions for analysis module
//!
//! Shared helper functions used across analysis submodules.

use crate::errors::AnalysisError;
use statrs::function::erf::erfc;

/// Calculate mean of a vector
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean_val = mean(values);
    let variance =
        values.iter().map(|v| (v - mean_val).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Calculate median of a vector
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;

    if values.len().is_multiple_of(2) {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Scale distances by their maximum so they fall in `[0, 1]`.
///
/// # Errors
///
/// * [`AnalysisError::DegenerateDistances`] for empty input, negative or
///   non-finite values, or a maximum of zero
/// * [`AnalysisError::OutOfUnitRange`] if a scaled value escapes `[0, 1]`
pub fn normalize_by_max(values: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::DegenerateDistances(
            "no distances to scale".to_string(),
        ));
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        return Err(AnalysisError::DegenerateDistances(format!(
            "invalid distance {} at position {idx}",
            values[idx]
        )));
    }

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Err(AnalysisError::DegenerateDistances(
            "all distances are zero".to_string(),
        ));
    }

    let scaled: Vec<f64> = values.iter().map(|v| v / max).collect();
    if let Some(index) = scaled.iter().position(|v| !(0.0..=1.0).contains(v)) {
        return Err(AnalysisError::OutOfUnitRange {
            index,
            value: scaled[index],
        });
    }
    Ok(scaled)
}

/// Two-sided tail probability of a standard normal statistic.
#[inline]
pub fn two_sided_p_value(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[5.0]), 5.0);
    }

    #[test]
    fn test_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = std_dev(&values);
        assert!((sd - 2.138).abs() < 0.01);
    }

    #[test]
    fn test_median() {
        let mut values = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        assert_eq!(median(&mut values), 3.0);

        let mut values_even = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(median(&mut values_even), 2.5);
    }

    #[test]
    fn test_normalize_by_max() {
        let scaled = normalize_by_max(&[1.0, 4.0, 2.0, 0.0]).unwrap();
        assert_eq!(scaled, vec![0.25, 1.0, 0.5, 0.0]);
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(scaled.contains(&1.0));
    }

    #[test]
    fn test_normalize_by_max_degenerate() {
        assert!(matches!(
            normalize_by_max(&[]),
            Err(AnalysisError::DegenerateDistances(_))
        ));
        assert!(matches!(
            normalize_by_max(&[0.0, 0.0, 0.0]),
            Err(AnalysisError::DegenerateDistances(_))
        ));
        assert!(normalize_by_max(&[1.0, f64::NAN]).is_err());
        assert!(normalize_by_max(&[1.0, -0.5]).is_err());
    }

    #[test]
    fn test_two_sided_p_value() {
        assert!((two_sided_p_value(1.959_964) - 0.05).abs() < 1e-6);
        assert!((two_sided_p_value(-1.959_964) - 0.05).abs() < 1e-6);
        assert!((two_sided_p_value(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_sided_p_value_tails() {
        // 2 * (1 - Phi(|z|)) for z = 0.5 * sqrt(2), sqrt(2), 3 * sqrt(2), 5 * sqrt(2)
        let cases = [
            (0.5, 0.479_500_122_186_953_5),
            (1.0, 0.157_299_207_050_285_13),
            (3.0, 2.209_049_699_858_544e-5),
            (5.0, 1.537_459_794_428_034_8e-12),
        ];
        for (x, expected) in cases {
            let p = two_sided_p_value(x * std::f64::consts::SQRT_2);
            assert!(((p - expected) / expected).abs() < 1e-10, "x = {x}: {p}");
        }
        assert!(two_sided_p_value(40.0) >= 0.0);
    }
}
