//! Ordered collection of aligned sample distributions.

use super::{CumulativeDistribution, Distribution};
use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

/// Named distributions sharing a single category order.
///
/// Engines borrow a `SampleSet` and never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSampleSet")]
pub struct SampleSet {
    categories: Arc<[String]>,
    samples: Vec<Distribution>,
}

impl SampleSet {
    /// Build a set from distributions, validating names and category alignment.
    pub fn new(samples: Vec<Distribution>) -> Result<Self> {
        let first = samples
            .first()
            .ok_or_else(|| MixError::InvalidInput("sample set is empty".to_string()))?;
        let categories = Arc::clone(first.shared_categories());

        let mut seen = HashSet::with_capacity(samples.len());
        for sample in &samples {
            first.ensure_aligned(sample)?;
            if !seen.insert(sample.name()) {
                return Err(MixError::InvalidInput(format!(
                    "duplicate sample name '{}'",
                    sample.name()
                )));
            }
        }

        Ok(Self {
            categories,
            samples,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Shared category order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Samples in input order.
    pub fn samples(&self) -> &[Distribution] {
        &self.samples
    }

    /// Iterate over samples in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Distribution> {
        self.samples.iter()
    }

    /// Sample names in input order.
    pub fn names(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.name()).collect()
    }

    /// Position of a sample by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s.name() == name)
    }

    /// Look up a sample by name.
    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.samples.iter().find(|s| s.name() == name)
    }

    /// Look up a sample by name, failing with `InvalidInput` when absent.
    pub fn require(&self, name: &str) -> Result<&Distribution> {
        self.get(name).ok_or_else(|| {
            MixError::InvalidInput(format!(
                "sample '{}' not found (available: {})",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Cumulative forms of every sample, in input order.
    pub fn cumulative(&self) -> Vec<CumulativeDistribution> {
        self.samples.iter().map(|s| s.cumulative()).collect()
    }

    /// Write one row per sample, proportions (or cumulative proportions) as columns.
    pub fn write_tsv<W: Write>(&self, writer: &mut W, cumulative: bool) -> Result<()> {
        write!(writer, "sample")?;
        for category in self.categories.iter() {
            write!(writer, "\t{}", category)?;
        }
        writeln!(writer)?;

        for sample in &self.samples {
            write!(writer, "{}", sample.name())?;
            let cdf;
            let values = if cumulative {
                cdf = sample.cumulative();
                cdf.values()
            } else {
                sample.proportions()
            };
            for v in values {
                write!(writer, "\t{:.6}", v)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawSampleSet {
    categories: Vec<String>,
    samples: Vec<Distribution>,
}

impl TryFrom<RawSampleSet> for SampleSet {
    type Error = MixError;

    fn try_from(raw: RawSampleSet) -> Result<Self> {
        let set = Self::new(raw.samples)?;
        if set.categories() != raw.categories.as_slice() {
            return Err(MixError::InvalidInput(format!(
                "sample set categories ({}) differ from its samples' ({})",
                raw.categories.join(","),
                set.categories().join(",")
            )));
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Distribution;
    type IntoIter = std::slice::Iter<'a, Distribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<[String]> {
        vec!["A".to_string(), "B".to_string()].into()
    }

    #[test]
    fn test_lookup() {
        let cats = shared();
        let set = SampleSet::new(vec![
            Distribution::from_counts("north", Arc::clone(&cats), &[1.0, 3.0]).unwrap(),
            Distribution::from_counts("south", cats, &[2.0, 2.0]).unwrap(),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["north", "south"]);
        assert_eq!(set.index_of("south"), Some(1));
        assert!(set.require("east").is_err());
        assert_eq!(set.categories(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let cats = shared();
        let result = SampleSet::new(vec![
            Distribution::from_counts("x", Arc::clone(&cats), &[1.0, 3.0]).unwrap(),
            Distribution::from_counts("x", cats, &[2.0, 2.0]).unwrap(),
        ]);
        assert!(matches!(result, Err(MixError::InvalidInput(_))));
    }

    #[test]
    fn test_misaligned_rejected() {
        let result = SampleSet::new(vec![
            Distribution::new("x", ["A", "B"], &[1.0, 3.0]).unwrap(),
            Distribution::new("y", ["A", "C"], &[2.0, 2.0]).unwrap(),
        ]);
        assert!(matches!(result, Err(MixError::InvalidInput(_))));
    }

    #[test]
    fn test_write_tsv() {
        let cats = shared();
        let set = SampleSet::new(vec![
            Distribution::from_counts("north", Arc::clone(&cats), &[1.0, 3.0]).unwrap(),
            Distribution::from_counts("south", cats, &[2.0, 2.0]).unwrap(),
        ])
        .unwrap();

        let mut buf = Vec::new();
        set.write_tsv(&mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "sample\tA\tB\nnorth\t0.250000\t0.750000\nsouth\t0.500000\t0.500000\n");

        let mut buf = Vec::new();
        set.write_tsv(&mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("north\t0.250000\t1.000000"));
    }

    #[test]
    fn test_deserialize_validates() {
        let cats = shared();
        let set = SampleSet::new(vec![
            Distribution::from_counts("x", Arc::clone(&cats), &[1.0, 3.0]).unwrap(),
            Distribution::from_counts("y", cats, &[2.0, 2.0]).unwrap(),
        ])
        .unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(serde_json::from_str::<SampleSet>(&json).unwrap(), set);

        let duplicate = json.replace(r#""name":"y""#, r#""name":"x""#);
        assert!(serde_json::from_str::<SampleSet>(&duplicate).is_err());

        let relabeled = json.replacen(r#"["A","B"]"#, r#"["A","C"]"#, 1);
        assert!(serde_json::from_str::<SampleSet>(&relabeled).is_err());

        let misaligned = r#"{"categories":["A","B"],"samples":[
            {"name":"x","categories":["A","B"],"proportions":[0.5,0.5]},
            {"name":"y","categories":["B","A"],"proportions":[0.5,0.5]}]}"#;
        assert!(serde_json::from_str::<SampleSet>(misaligned).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(SampleSet::new(vec![]).is_err());
    }
}
