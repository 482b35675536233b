//! Order-sensitive metrics over cumulative distributions.
//!
//! Both statistics depend on the path taken through the running sums, so
//! every distribution compared in one analysis must be accumulated along the
//! same category order.

use super::normalized_pair;
use crate::data::CumulativeDistribution;
use crate::error::{MixError, Result};

/// Kolmogorov-Smirnov statistic: max |A_i - B_i| over the cumulative sums.
///
/// Inputs are proportion (or count) vectors; cumulative sums are built internally.
pub fn ks(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(ks_streaming(&a, &b))
}

/// Kuiper statistic: `max(A - B) + max(B - A)` over the cumulative sums.
///
/// Each signed extremum is floored at zero, so the result is never below KS.
pub fn kuiper(a: &[f64], b: &[f64]) -> Result<f64> {
    let (a, b) = normalized_pair(a, b)?;
    Ok(kuiper_streaming(&a, &b))
}

/// KS statistic on prebuilt cumulative distributions.
pub fn ks_cdf(a: &CumulativeDistribution, b: &CumulativeDistribution) -> Result<f64> {
    check_aligned(a, b)?;
    let (d_plus, d_minus) = extrema(a.values().iter().copied().zip(b.values().iter().copied()));
    Ok(d_plus.max(d_minus))
}

/// Kuiper statistic on prebuilt cumulative distributions.
pub fn kuiper_cdf(a: &CumulativeDistribution, b: &CumulativeDistribution) -> Result<f64> {
    check_aligned(a, b)?;
    let (d_plus, d_minus) = extrema(a.values().iter().copied().zip(b.values().iter().copied()));
    Ok(d_plus + d_minus)
}

pub(crate) fn ks_streaming(a: &[f64], b: &[f64]) -> f64 {
    let (d_plus, d_minus) = extrema(running_pairs(a, b));
    d_plus.max(d_minus)
}

pub(crate) fn kuiper_streaming(a: &[f64], b: &[f64]) -> f64 {
    let (d_plus, d_minus) = extrema(running_pairs(a, b));
    d_plus + d_minus
}

/// Running sums of two proportion vectors, pairwise.
fn running_pairs<'a>(a: &'a [f64], b: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    a.iter().zip(b).scan((0.0, 0.0), |(ca, cb), (&x, &y)| {
        *ca += x;
        *cb += y;
        Some((*ca, *cb))
    })
}

/// Largest positive and negative signed differences, each floored at zero.
fn extrema(pairs: impl Iterator<Item = (f64, f64)>) -> (f64, f64) {
    pairs.fold((0.0f64, 0.0f64), |(plus, minus), (x, y)| {
        (plus.max(x - y), minus.max(y - x))
    })
}

fn check_aligned(a: &CumulativeDistribution, b: &CumulativeDistribution) -> Result<()> {
    if a.same_categories(b) {
        Ok(())
    } else {
        Err(MixError::InvalidInput(format!(
            "category mismatch between '{}' and '{}'",
            a.name(),
            b.name()
        )))
    }
}
