//! Metrics comparing proportion vectors category by category.

use super::normalized_pair;
use crate::error::Result;

/// Variance below which a proportion vector is treated as constant.
const ZERO_VARIANCE: f64 = 1e-24;

/// Elementwise tolerance for the constant-vector identity check.
const IDENTICAL_TOLERANCE: f64 = 1e-12;

/// Squared Pearson correlation (cross-correlation R²) between two distributions.
///
/// When either vector has zero variance the correlation is undefined; the
/// result is then 1.0 if the vectors are identical and 0.0 otherwise.
pub fn r2(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(r2_normalized(&a, &b))
}

/// Sum of per-category geometric means, `Σ sqrt(a_i * b_i)`.
///
/// Equals 1.0 for identical distributions and 0.0 for disjoint support.
pub fn similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(similarity_normalized(&a, &b))
}

/// `1 - Σ|a_i - b_i| / 2`: the complement of total variation distance.
pub fn likeness(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(likeness_normalized(&a, &b))
}

/// Symmetric chi-squared distance, `Σ (a_i - b_i)² / (a_i + b_i)`.
///
/// Categories empty in both inputs contribute zero.
pub fn chi_squared(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(chi_squared_normalized(&a, &b))
}

pub(crate) fn r2_normalized(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a / n < ZERO_VARIANCE || var_b / n < ZERO_VARIANCE {
        let identical = a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= IDENTICAL_TOLERANCE);
        return if identical { 1.0 } else { 0.0 };
    }

    let r = cov / (var_a * var_b).sqrt();
    (r * r).min(1.0)
}

pub(crate) fn similarity_normalized(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x * y).sqrt())
        .sum::<f64>()
        .min(1.0)
}

pub(crate) fn likeness_normalized(a: &[f64], b: &[f64]) -> f64 {
    let mismatch: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    (1.0 - mismatch / 2.0).clamp(0.0, 1.0)
}

pub(crate) fn chi_squared_normalized(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .filter(|(&x, &y)| x + y > 0.0)
        .map(|(&x, &y)| {
            let diff = x - y;
            diff * diff / (x + y)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_r2_perfect_linear() {
        // b = 0.5 * a + 1/6 still sums to one and is perfectly correlated with a
        let a = [0.2, 0.3, 0.5];
        let b: Vec<f64> = a.iter().map(|x| 0.5 * x + 1.0 / 6.0).collect();
        assert_relative_eq!(r2(&a, &b).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r2(&a, &a).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_known_value() {
        // Opposite two-category vectors are perfectly (negatively) correlated.
        assert_relative_eq!(r2(&[0.8, 0.2], &[0.2, 0.8]).unwrap(), 1.0, epsilon = 1e-12);
        // a = (1,2,3), b = (1,3,2): r = 0.5
        assert_relative_eq!(r2(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_zero_variance() {
        assert_eq!(r2(&[0.5, 0.5], &[0.5, 0.5]).unwrap(), 1.0);
        assert_eq!(r2(&[0.5, 0.5], &[0.8, 0.2]).unwrap(), 0.0);
        assert_eq!(r2(&[0.8, 0.2], &[1.0, 1.0]).unwrap(), 0.0);
        assert!(r2(&[1.0, 1.0, 1.0], &[3.0, 3.0, 3.0]).unwrap() == 1.0);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_relative_eq!(similarity(&[0.3, 0.7], &[0.3, 0.7]).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        // sqrt(0.25) + sqrt(0.25) = 1.0 when (0.5,0.5) vs (0.5,0.5); partial overlap below one
        let s = similarity(&[0.5, 0.5], &[1.0, 0.0]).unwrap();
        assert_relative_eq!(s, 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_likeness() {
        assert_relative_eq!(likeness(&[0.8, 0.2], &[0.2, 0.8]).unwrap(), 0.4, epsilon = 1e-12);
        assert_eq!(likeness(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        // raw counts are normalized first
        assert_relative_eq!(likeness(&[8.0, 2.0], &[4.0, 1.0]).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_chi_squared() {
        // (0.6)^2 / 1.0 twice
        assert_relative_eq!(chi_squared(&[0.8, 0.2], &[0.2, 0.8]).unwrap(), 0.72, epsilon = 1e-12);
        // both-zero categories are skipped rather than producing NaN
        let d = chi_squared(&[0.5, 0.0, 0.5], &[0.5, 0.0, 0.5]).unwrap();
        assert_eq!(d, 0.0);
        assert_relative_eq!(chi_squared(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 2.0, epsilon = 1e-12);
    }
}
