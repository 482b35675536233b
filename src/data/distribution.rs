//! Normalized categorical distributions and their cumulative forms.

use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest accepted deviation from 1.0 for proportions supplied directly.
pub const PROPORTION_TOLERANCE: f64 = 1e-9;

/// A named categorical distribution: proportions over a fixed category order.
///
/// Proportions are non-negative and sum to 1.0. Category lists are shared
/// (`Arc`) between all distributions derived from the same sample set, so
/// alignment checks are usually a pointer comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution")]
pub struct Distribution {
    name: String,
    categories: Arc<[String]>,
    proportions: Vec<f64>,
}

impl Distribution {
    /// Normalize non-negative weights (counts or proportions) into a distribution.
    ///
    /// Fails when lengths differ, a weight is negative or non-finite, or the
    /// weights do not sum to a positive value.
    pub fn from_counts(
        name: impl Into<String>,
        categories: Arc<[String]>,
        counts: &[f64],
    ) -> Result<Self> {
        let name = name.into();
        if categories.len() != counts.len() {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': {} categories but {} counts",
                name,
                categories.len(),
                counts.len()
            )));
        }
        if categories.is_empty() {
            return Err(MixError::InvalidInput(format!(
                "sample '{}' has no categories",
                name
            )));
        }
        if let Some((i, &bad)) = counts
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': invalid count {} for category '{}'",
                name, bad, categories[i]
            )));
        }

        let total: f64 = counts.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': counts must sum to a positive value",
                name
            )));
        }

        Ok(Self {
            name,
            categories,
            proportions: counts.iter().map(|&c| c / total).collect(),
        })
    }

    /// Wrap proportions that already sum to 1.0 without rescaling them.
    ///
    /// Fails under the same conditions as [`Distribution::from_counts`], and
    /// when the sum is further than [`PROPORTION_TOLERANCE`] from 1.0.
    pub fn from_proportions(
        name: impl Into<String>,
        categories: Arc<[String]>,
        proportions: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        Self::from_counts(name.clone(), Arc::clone(&categories), &proportions)?;
        let total: f64 = proportions.iter().sum();
        if (total - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': proportions sum to {}, expected 1",
                name, total
            )));
        }
        Ok(Self {
            name,
            categories,
            proportions,
        })
    }

    /// Convenience constructor that owns its category list.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
        counts: &[f64],
    ) -> Result<Self> {
        let categories: Arc<[String]> = categories.into_iter().map(Into::into).collect();
        Self::from_counts(name, categories, counts)
    }

    /// Weighted sum of component distributions.
    ///
    /// Components must share one category order. Weights must be non-negative
    /// with a positive sum; the result is renormalized.
    pub fn mixture(
        name: impl Into<String>,
        components: &[Distribution],
        weights: &[f64],
    ) -> Result<Self> {
        let first = components.first().ok_or_else(|| {
            MixError::InvalidInput("mixture requires at least one component".to_string())
        })?;
        if components.len() != weights.len() {
            return Err(MixError::InvalidInput(format!(
                "mixture has {} components but {} weights",
                components.len(),
                weights.len()
            )));
        }
        for component in &components[1..] {
            first.ensure_aligned(component)?;
        }

        let mut mixed = vec![0.0; first.len()];
        mix_into(components, weights, &mut mixed);
        Self::from_counts(name, Arc::clone(&first.categories), &mixed)
    }

    /// Sample name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared category order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub(crate) fn shared_categories(&self) -> &Arc<[String]> {
        &self.categories
    }

    /// Proportions in category order.
    pub fn proportions(&self) -> &[f64] {
        &self.proportions
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.proportions.len()
    }

    /// Always false for a constructed distribution.
    pub fn is_empty(&self) -> bool {
        self.proportions.is_empty()
    }

    /// Proportion for a category, if present.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.proportions[i])
    }

    /// The category holding the largest proportion (first on ties).
    pub fn dominant(&self) -> (&str, f64) {
        let mut best = 0;
        for (i, &p) in self.proportions.iter().enumerate() {
            if p > self.proportions[best] {
                best = i;
            }
        }
        (&self.categories[best], self.proportions[best])
    }

    /// Whether both distributions use the same category order.
    pub fn same_categories(&self, other: &Distribution) -> bool {
        Arc::ptr_eq(&self.categories, &other.categories) || self.categories == other.categories
    }

    /// Fail with `InvalidInput` unless `other` shares this category order.
    pub fn ensure_aligned(&self, other: &Distribution) -> Result<()> {
        if self.same_categories(other) {
            return Ok(());
        }
        Err(MixError::InvalidInput(format!(
            "category mismatch between '{}' ({}) and '{}' ({})",
            self.name,
            self.categories.join(","),
            other.name,
            other.categories.join(",")
        )))
    }

    /// Cumulative form over the fixed category order.
    pub fn cumulative(&self) -> CumulativeDistribution {
        CumulativeDistribution::from(self)
    }

    /// Copy with a different name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Arc::clone(&self.categories),
            proportions: self.proportions.clone(),
        }
    }
}

/// Running sum of a [`Distribution`] over its category order.
///
/// Non-decreasing; the final entry is exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCumulative")]
pub struct CumulativeDistribution {
    name: String,
    categories: Arc<[String]>,
    values: Vec<f64>,
}

impl CumulativeDistribution {
    /// Sample name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category order the sums were accumulated along.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Cumulative proportions.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether both cumulative forms share one category order.
    pub fn same_categories(&self, other: &CumulativeDistribution) -> bool {
        Arc::ptr_eq(&self.categories, &other.categories) || self.categories == other.categories
    }
}

impl From<&Distribution> for CumulativeDistribution {
    fn from(dist: &Distribution) -> Self {
        let mut running = 0.0;
        let mut values: Vec<f64> = dist
            .proportions
            .iter()
            .map(|&p| {
                running += p;
                running.min(1.0)
            })
            .collect();
        if let Some(last) = values.last_mut() {
            *last = 1.0;
        }
        Self {
            name: dist.name.clone(),
            categories: Arc::clone(&dist.categories),
            values,
        }
    }
}

#[derive(Deserialize)]
struct RawDistribution {
    name: String,
    categories: Vec<String>,
    proportions: Vec<f64>,
}

impl TryFrom<RawDistribution> for Distribution {
    type Error = MixError;

    fn try_from(raw: RawDistribution) -> Result<Self> {
        Self::from_proportions(raw.name, raw.categories.into(), raw.proportions)
    }
}

#[derive(Deserialize)]
struct RawCumulative {
    name: String,
    categories: Vec<String>,
    values: Vec<f64>,
}

impl TryFrom<RawCumulative> for CumulativeDistribution {
    type Error = MixError;

    fn try_from(raw: RawCumulative) -> Result<Self> {
        let invalid = |reason: &str| {
            Err(MixError::InvalidInput(format!(
                "cumulative sample '{}': {}",
                raw.name, reason
            )))
        };
        if raw.categories.is_empty() || raw.categories.len() != raw.values.len() {
            return invalid("values must match a non-empty category list");
        }
        if raw.values.iter().any(|v| !v.is_finite() || *v < 0.0 || *v > 1.0) {
            return invalid("values must lie in [0, 1]");
        }
        if raw.values.windows(2).any(|w| w[0] > w[1]) {
            return invalid("values must be non-decreasing");
        }
        if raw.values.last() != Some(&1.0) {
            return invalid("final value must be 1");
        }
        Ok(Self {
            name: raw.name,
            categories: raw.categories.into(),
            values: raw.values,
        })
    }
}

/// Write `Σ weights[j] * components[j]` into `out`.
///
/// Callers guarantee alignment and `out.len()` equal to the category count.
pub(crate) fn mix_into(components: &[Distribution], weights: &[f64], out: &mut [f64]) {
    out.iter_mut().for_each(|v| *v = 0.0);
    for (component, &w) in components.iter().zip(weights) {
        for (acc, &p) in out.iter_mut().zip(&component.proportions) {
            *acc += w * p;
        }
    }
}
