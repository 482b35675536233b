//! Total Sum Scaling (TSS) of category counts into proportions.
//!
//! TSS converts counts to relative abundances by dividing each count by the
//! sample total. Before scaling, configured categories (typically an
//! "unknown" bucket) are dropped and every sample is aligned to one canonical
//! category order, so downstream metrics compare like with like.

use crate::data::{CategoryOrder, CategoryVector, CountTable, Distribution, SampleSet};
use crate::error::{MixError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Configuration for TSS normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TssConfig {
    /// Categories removed before normalization (case-insensitive).
    pub exclude: Vec<String>,
    /// How the shared category order is fixed.
    pub category_order: CategoryOrder,
}

impl Default for TssConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["unknown".to_string()],
            category_order: CategoryOrder::AsGiven,
        }
    }
}

impl TssConfig {
    /// Keep every category.
    pub fn keep_all() -> Self {
        Self {
            exclude: Vec::new(),
            ..Default::default()
        }
    }

    fn is_excluded(&self, category: &str) -> bool {
        self.exclude.iter().any(|e| e.eq_ignore_ascii_case(category))
    }
}

/// Normalize raw category vectors into an aligned [`SampleSet`].
///
/// # Rules
/// - Excluded categories are dropped from every sample.
/// - All samples must share the remaining category set, else `InvalidInput`.
/// - Each sample's remaining counts must sum to a positive value, else `InvalidInput`.
///
/// # Example
/// ```ignore
/// let samples = norm_tss(&table.to_category_vectors()?, &TssConfig::default())?;
/// ```
pub fn norm_tss(vectors: &[CategoryVector], config: &TssConfig) -> Result<SampleSet> {
    let first = vectors
        .first()
        .ok_or_else(|| MixError::InvalidInput("no samples to normalize".to_string()))?;

    let mut order: Vec<String> = first
        .categories()
        .filter(|c| !config.is_excluded(c))
        .map(str::to_string)
        .collect();
    if order.is_empty() {
        return Err(MixError::InvalidInput(format!(
            "sample '{}' has no categories left after exclusion",
            first.name()
        )));
    }
    if config.category_order == CategoryOrder::Alphabetical {
        order.sort();
    }
    let expected: HashSet<&str> = order.iter().map(String::as_str).collect();

    // Key sets are checked up front so that errors are reported in input order.
    for vector in vectors {
        let kept: HashSet<&str> = vector
            .categories()
            .filter(|c| !config.is_excluded(c))
            .collect();
        if kept != expected {
            let mut missing: Vec<&str> = expected.difference(&kept).copied().collect();
            let mut extra: Vec<&str> = kept.difference(&expected).copied().collect();
            missing.sort_unstable();
            extra.sort_unstable();
            return Err(MixError::InvalidInput(format!(
                "sample '{}' does not share the category set (missing: [{}], unexpected: [{}])",
                vector.name(),
                missing.join(", "),
                extra.join(", ")
            )));
        }
    }

    let categories: Arc<[String]> = order.into();
    let distributions: Vec<Distribution> = vectors
        .par_iter()
        .map(|vector| {
            let counts: Vec<f64> = categories
                .iter()
                .map(|c| vector.get(c).unwrap_or(0.0))
                .collect();
            Distribution::from_counts(vector.name(), Arc::clone(&categories), &counts)
        })
        .collect::<Result<_>>()?;

    SampleSet::new(distributions)
}

/// Normalize every row of a [`CountTable`].
pub fn norm_tss_table(table: &CountTable, config: &TssConfig) -> Result<SampleSet> {
    norm_tss(&table.to_category_vectors()?, config)
}
