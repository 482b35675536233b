//! Raw per-sample category counts.

use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};

/// How the canonical category order is fixed when samples are normalized.
///
/// The order matters for cumulative metrics (KS, Kuiper): every sample in one
/// analysis run is accumulated along the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Keep the order of the first sample (the input table's column order).
    #[default]
    AsGiven,
    /// Sort category names lexicographically.
    Alphabetical,
}

/// An ordered mapping from category name to a non-negative count for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCategoryVector")]
pub struct CategoryVector {
    name: String,
    entries: Vec<(String, f64)>,
}

impl CategoryVector {
    /// Create an empty vector for the named sample.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Build a vector from `(category, count)` pairs, preserving their order.
    pub fn from_pairs<I, S>(name: impl Into<String>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut vector = Self::new(name);
        for (category, count) in pairs {
            vector.insert(category, count)?;
        }
        Ok(vector)
    }

    /// Append a category count.
    ///
    /// Fails on negative or non-finite counts and on duplicate categories.
    pub fn insert(&mut self, category: impl Into<String>, count: f64) -> Result<()> {
        let category = category.into();
        if !count.is_finite() || count < 0.0 {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': count for category '{}' must be a non-negative number, got {}",
                self.name, category, count
            )));
        }
        if self.get(&category).is_some() {
            return Err(MixError::InvalidInput(format!(
                "sample '{}': duplicate category '{}'",
                self.name, category
            )));
        }
        self.entries.push((category, count));
        Ok(())
    }

    /// Sample name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count for a category, if present.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, count)| *count)
    }

    /// Category names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// `(category, count)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(c, count)| (c.as_str(), *count))
    }

    /// Sum of all counts.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct RawCategoryVector {
    name: String,
    entries: Vec<(String, f64)>,
}

impl TryFrom<RawCategoryVector> for CategoryVector {
    type Error = MixError;

    fn try_from(raw: RawCategoryVector) -> Result<Self> {
        Self::from_pairs(raw.name, raw.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_keeps_order() {
        let v = CategoryVector::from_pairs("site", [("PE", 3.0), ("PP", 1.0), ("PS", 0.0)]).unwrap();
        let cats: Vec<&str> = v.categories().collect();
        assert_eq!(cats, vec!["PE", "PP", "PS"]);
        assert_eq!(v.get("PP"), Some(1.0));
        assert_eq!(v.get("PET"), None);
        assert_eq!(v.total(), 4.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let v = CategoryVector::from_pairs("site", [("PE", 3.0), ("PP", 1.0)]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(serde_json::from_str::<CategoryVector>(&json).unwrap(), v);

        let negative = r#"{"name":"site","entries":[["PE",-2.0]]}"#;
        assert!(serde_json::from_str::<CategoryVector>(negative).is_err());
        let duplicate = r#"{"name":"site","entries":[["PE",1.0],["PE",2.0]]}"#;
        assert!(serde_json::from_str::<CategoryVector>(duplicate).is_err());
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let mut v = CategoryVector::new("site");
        assert!(matches!(v.insert("PE", -1.0), Err(MixError::InvalidInput(_))));
        assert!(matches!(v.insert("PE", f64::NAN), Err(MixError::InvalidInput(_))));
        assert!(v.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let mut v = CategoryVector::new("site");
        v.insert("PE", 1.0).unwrap();
        assert!(v.insert("PE", 2.0).is_err());
        assert_eq!(v.len(), 1);
    }
}
