//! Similarity and distance metrics between categorical distributions.
//!
//! Every metric is tagged with a [`MetricKind`]:
//!
//! - **Similarity** (higher = more alike, bounded in [0, 1]): `r2`, `similarity`, `likeness`
//! - **Distance** (lower = more alike): `ks`, `kuiper`, `chi_squared`
//!
//! `ks` and `kuiper` compare cumulative distributions accumulated along the
//! sample set's canonical category order; the others compare proportions.
//!
//! The slice functions in [`proportion`] and [`cumulative`] accept raw
//! non-negative weights and normalize internally. [`Metric::score`] works on
//! already-normalized [`Distribution`]s and checks category alignment.

pub mod cumulative;
mod matrix;
pub mod proportion;

pub use cumulative::{ks, ks_cdf, kuiper, kuiper_cdf};
pub use matrix::{metric_matrices, metric_matrix, MetricMatrix};
pub use proportion::{chi_squared, likeness, r2, similarity};

use crate::data::Distribution;
use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Direction of a metric's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Higher is more alike.
    Similarity,
    /// Lower is more alike.
    Distance,
}

/// The closed set of supported metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Pearson correlation of proportions.
    #[serde(alias = "cross_correlation")]
    R2,
    /// Sum of per-category geometric means (Bhattacharyya coefficient).
    Similarity,
    /// One minus the total variation distance.
    Likeness,
    /// Kolmogorov-Smirnov statistic over cumulative distributions.
    Ks,
    /// Kuiper statistic over cumulative distributions.
    Kuiper,
    /// Symmetric chi-squared distance.
    #[serde(alias = "chi2")]
    ChiSquared,
}

impl Metric {
    /// All metrics, in reporting order.
    pub const ALL: [Metric; 6] = [
        Metric::R2,
        Metric::Similarity,
        Metric::Likeness,
        Metric::Ks,
        Metric::Kuiper,
        Metric::ChiSquared,
    ];

    /// Canonical identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::R2 => "r2",
            Self::Similarity => "similarity",
            Self::Likeness => "likeness",
            Self::Ks => "ks",
            Self::Kuiper => "kuiper",
            Self::ChiSquared => "chi_squared",
        }
    }

    /// Whether higher or lower scores mean "more alike".
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::R2 | Self::Similarity | Self::Likeness => MetricKind::Similarity,
            Self::Ks | Self::Kuiper | Self::ChiSquared => MetricKind::Distance,
        }
    }

    /// Whether the metric compares cumulative distributions.
    pub fn is_cumulative(&self) -> bool {
        matches!(self, Self::Ks | Self::Kuiper)
    }

    /// Score of a distribution against itself.
    pub fn best_value(&self) -> f64 {
        match self.kind() {
            MetricKind::Similarity => 1.0,
            MetricKind::Distance => 0.0,
        }
    }

    /// Score two aligned distributions.
    ///
    /// Fails with `InvalidInput` when the category orders differ.
    pub fn score(&self, a: &Distribution, b: &Distribution) -> Result<f64> {
        a.ensure_aligned(b)?;
        Ok(self.score_normalized(a.proportions(), b.proportions()))
    }

    /// Score two raw weight vectors, normalizing each internally.
    pub fn score_values(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        match self {
            Self::R2 => r2(a, b),
            Self::Similarity => similarity(a, b),
            Self::Likeness => likeness(a, b),
            Self::Ks => ks(a, b),
            Self::Kuiper => kuiper(a, b),
            Self::ChiSquared => chi_squared(a, b),
        }
    }

    /// Score two proportion vectors that are already validated and normalized.
    pub(crate) fn score_normalized(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::R2 => proportion::r2_normalized(a, b),
            Self::Similarity => proportion::similarity_normalized(a, b),
            Self::Likeness => proportion::likeness_normalized(a, b),
            Self::Ks => cumulative::ks_streaming(a, b),
            Self::Kuiper => cumulative::kuiper_streaming(a, b),
            Self::ChiSquared => proportion::chi_squared_normalized(a, b),
        }
    }

    /// Convert a score to distance semantics (0 = identical, never negative).
    pub fn to_dissimilarity(&self, score: f64) -> f64 {
        let d = match self.kind() {
            MetricKind::Similarity => 1.0 - score,
            MetricKind::Distance => score,
        };
        d.max(0.0)
    }

    /// Map a score so that lower always means more consistent.
    pub(crate) fn oriented(&self, score: f64) -> f64 {
        match self.kind() {
            MetricKind::Similarity => -score,
            MetricKind::Distance => score,
        }
    }

    /// Order two scores so the better one comes first.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        self.oriented(a).total_cmp(&self.oriented(b))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "r2" | "cross_correlation" => Ok(Self::R2),
            "similarity" => Ok(Self::Similarity),
            "likeness" => Ok(Self::Likeness),
            "ks" => Ok(Self::Ks),
            "kuiper" => Ok(Self::Kuiper),
            "chi_squared" | "chi2" => Ok(Self::ChiSquared),
            _ => Err(MixError::UnknownMetric(s.to_string())),
        }
    }
}

/// Validate a raw weight vector and scale it to sum to one.
pub(crate) fn normalized(values: &[f64], label: &str) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(MixError::InvalidInput(format!("{} is empty", label)));
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(MixError::InvalidInput(format!(
            "{} contains negative or non-finite values",
            label
        )));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(MixError::InvalidInput(format!(
            "{} must sum to a positive value",
            label
        )));
    }
    Ok(values.iter().map(|v| v / total).collect())
}

/// Validate and normalize a pair of inputs of equal length.
pub(crate) fn normalized_pair(a: &[f64], b: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if a.len() != b.len() {
        return Err(MixError::InvalidInput(format!(
            "distributions have different lengths ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    Ok((normalized(a, "first distribution")?, normalized(b, "second distribution")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pairs() -> Vec<(Vec<f64>, Vec<f64>)> {
        vec![
            (vec![0.8, 0.2], vec![0.2, 0.8]),
            (vec![0.5, 0.3, 0.2], vec![0.1, 0.1, 0.8]),
            (vec![0.25, 0.25, 0.25, 0.25], vec![0.7, 0.0, 0.3, 0.0]),
            (vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]),
            (vec![0.1, 0.2, 0.3, 0.4], vec![0.4, 0.3, 0.2, 0.1]),
        ]
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("r2".parse::<Metric>().unwrap(), Metric::R2);
        assert_eq!("cross_correlation".parse::<Metric>().unwrap(), Metric::R2);
        assert_eq!("Chi-Squared".parse::<Metric>().unwrap(), Metric::ChiSquared);
        assert_eq!(" KS ".parse::<Metric>().unwrap(), Metric::Ks);
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_unknown_metric() {
        let err = "euclid".parse::<Metric>().unwrap_err();
        assert!(matches!(err, MixError::UnknownMetric(ref name) if name == "euclid"));
    }

    #[test]
    fn test_self_score_is_best() {
        for (a, b) in pairs() {
            for metric in Metric::ALL {
                for v in [&a, &b] {
                    let s = metric.score_values(v, v).unwrap();
                    assert_relative_eq!(s, metric.best_value(), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_symmetry() {
        for (a, b) in pairs() {
            for metric in Metric::ALL {
                let ab = metric.score_values(&a, &b).unwrap();
                let ba = metric.score_values(&b, &a).unwrap();
                assert_eq!(ab, ba, "{} not symmetric", metric);
            }
        }
    }

    #[test]
    fn test_kuiper_at_least_ks() {
        for (a, b) in pairs() {
            let k = ks(&a, &b).unwrap();
            let v = kuiper(&a, &b).unwrap();
            assert!(v >= k, "kuiper {} < ks {}", v, k);
        }
    }

    #[test]
    fn test_score_requires_alignment() {
        let a = Distribution::new("a", ["PE", "PP"], &[1.0, 1.0]).unwrap();
        let b = Distribution::new("b", ["PE", "PS"], &[1.0, 1.0]).unwrap();
        for metric in Metric::ALL {
            assert!(matches!(metric.score(&a, &b), Err(MixError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_score_matches_slice_functions() {
        let a = Distribution::new("a", ["A", "B", "C"], &[5.0, 3.0, 2.0]).unwrap();
        let b = Distribution::new("b", ["A", "B", "C"], &[1.0, 1.0, 8.0]).unwrap();
        for metric in Metric::ALL {
            let via_dist = metric.score(&a, &b).unwrap();
            let via_slice = metric.score_values(&[5.0, 3.0, 2.0], &[1.0, 1.0, 8.0]).unwrap();
            assert_relative_eq!(via_dist, via_slice, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        for metric in Metric::ALL {
            assert!(metric.score_values(&[1.0, 2.0], &[1.0]).is_err());
            assert!(metric.score_values(&[0.0, 0.0], &[1.0, 1.0]).is_err());
            assert!(metric.score_values(&[], &[]).is_err());
            assert!(metric.score_values(&[-1.0, 2.0], &[1.0, 1.0]).is_err());
        }
    }

    #[test]
    fn test_orientation() {
        assert_eq!(Metric::R2.compare(0.9, 0.5), Ordering::Less);
        assert_eq!(Metric::Ks.compare(0.1, 0.5), Ordering::Less);
        assert_eq!(Metric::Likeness.to_dissimilarity(0.75), 0.25);
        assert_eq!(Metric::Kuiper.to_dissimilarity(0.4), 0.4);
        assert_eq!(Metric::R2.to_dissimilarity(1.0 + 1e-15), 0.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Metric::ChiSquared).unwrap();
        assert_eq!(json, "\"chi_squared\"");
        let parsed: Metric = serde_json::from_str("\"cross_correlation\"").unwrap();
        assert_eq!(parsed, Metric::R2);
    }
}
