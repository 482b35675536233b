//! Per-sample profiling of a count table.

use crate::data::CountTable;
use serde::{Deserialize, Serialize};

/// Count summary of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProfile {
    /// Sample identifier.
    pub name: String,
    /// Total count over retained categories.
    pub total: f64,
    /// Number of retained categories with a non-zero count.
    pub n_present: usize,
    /// Category with the largest retained count (first on ties), if any.
    pub dominant: Option<String>,
    /// Dominant category's share of the retained total.
    pub dominant_proportion: f64,
    /// Count mass in excluded categories.
    pub excluded: f64,
}

impl SampleProfile {
    /// Fraction of all counts that fell into excluded categories.
    pub fn excluded_fraction(&self) -> f64 {
        let all = self.total + self.excluded;
        if all > 0.0 {
            self.excluded / all
        } else {
            0.0
        }
    }

    /// Whether nothing is left after exclusion.
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }
}

/// Profile of every sample in a count table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    /// Number of samples.
    pub n_samples: usize,
    /// Number of retained categories.
    pub n_categories: usize,
    /// Categories dropped by the exclusion list.
    pub excluded_categories: Vec<String>,
    pub samples: Vec<SampleProfile>,
    /// Mean retained total.
    pub mean_total: f64,
    /// Median retained total.
    pub median_total: f64,
    pub min_total: f64,
    pub max_total: f64,
}

impl TableProfile {
    /// Samples whose retained total is zero; these cannot be normalized.
    pub fn empty_samples(&self) -> Vec<&str> {
        self.samples
            .iter()
            .filter(|s| s.is_empty())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Samples with fewer than `min_total` retained counts.
    pub fn samples_below(&self, min_total: f64) -> Vec<&str> {
        self.samples
            .iter()
            .filter(|s| s.total < min_total)
            .map(|s| s.name.as_str())
            .collect()
    }
}

impl std::fmt::Display for TableProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sample Profile")?;
        writeln!(f, "  Samples:    {}", self.n_samples)?;
        writeln!(f, "  Categories: {}", self.n_categories)?;
        if !self.excluded_categories.is_empty() {
            writeln!(f, "  Excluded:   {}", self.excluded_categories.join(", "))?;
        }
        writeln!(f, "  Total counts: mean {:.1}, median {:.1}, range {:.0}-{:.0}",
            self.mean_total, self.median_total, self.min_total, self.max_total)?;
        writeln!(f)?;
        writeln!(f, "  {:<20} {:>10} {:>8} {:<16} {:>8}", "Sample", "Total", "Present", "Dominant", "Share")?;
        for s in &self.samples {
            writeln!(
                f,
                "  {:<20} {:>10.0} {:>8} {:<16} {:>7.1}%",
                s.name,
                s.total,
                s.n_present,
                s.dominant.as_deref().unwrap_or("-"),
                s.dominant_proportion * 100.0
            )?;
        }
        Ok(())
    }
}

/// Profile every sample of `table`, ignoring the `exclude` categories
/// (matched case-insensitively) for totals and dominance.
pub fn profile_samples(table: &CountTable, exclude: &[String]) -> TableProfile {
    let is_excluded: Vec<bool> = table
        .categories()
        .iter()
        .map(|c| exclude.iter().any(|e| e.eq_ignore_ascii_case(c)))
        .collect();
    let excluded_categories: Vec<String> = table
        .categories()
        .iter()
        .zip(&is_excluded)
        .filter(|(_, &ex)| ex)
        .map(|(c, _)| c.clone())
        .collect();

    let samples: Vec<SampleProfile> = (0..table.n_samples())
        .map(|i| {
            let mut total = 0.0;
            let mut excluded = 0.0;
            let mut n_present = 0;
            let mut dominant: Option<(usize, f64)> = None;
            for (j, &count) in table.row(i).iter().enumerate() {
                if is_excluded[j] {
                    excluded += count;
                    continue;
                }
                total += count;
                if count > 0.0 {
                    n_present += 1;
                    if dominant.map_or(true, |(_, best)| count > best) {
                        dominant = Some((j, count));
                    }
                }
            }
            SampleProfile {
                name: table.sample_ids()[i].clone(),
                total,
                n_present,
                dominant: dominant.map(|(j, _)| table.categories()[j].clone()),
                dominant_proportion: dominant.map_or(0.0, |(_, c)| c / total),
                excluded,
            }
        })
        .collect();

    let totals: Vec<f64> = samples.iter().map(|s| s.total).collect();
    let n_samples = totals.len();
    let (mean_total, median_total, min_total, max_total) = if n_samples == 0 {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        let mut sorted = totals.clone();
        sorted.sort_by(f64::total_cmp);
        let median = if n_samples % 2 == 0 {
            (sorted[n_samples / 2 - 1] + sorted[n_samples / 2]) / 2.0
        } else {
            sorted[n_samples / 2]
        };
        (
            totals.iter().sum::<f64>() / n_samples as f64,
            median,
            sorted[0],
            sorted[n_samples - 1],
        )
    };

    TableProfile {
        n_samples,
        n_categories: is_excluded.iter().filter(|&&ex| !ex).count(),
        excluded_categories,
        samples,
        mean_total,
        median_total,
        min_total,
        max_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_table() -> CountTable {
        CountTable::new(
            vec!["beach".into(), "river".into(), "empty".into()],
            vec!["fiber".into(), "fragment".into(), "unknown".into()],
            vec![
                vec![30.0, 10.0, 10.0],
                vec![5.0, 15.0, 0.0],
                vec![0.0, 0.0, 4.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_profile_samples() {
        let table = create_test_table();
        let profile = profile_samples(&table, &["Unknown".to_string()]);

        assert_eq!(profile.n_samples, 3);
        assert_eq!(profile.n_categories, 2);
        assert_eq!(profile.excluded_categories, vec!["unknown".to_string()]);

        let beach = &profile.samples[0];
        assert_eq!(beach.total, 40.0);
        assert_eq!(beach.n_present, 2);
        assert_eq!(beach.dominant.as_deref(), Some("fiber"));
        assert_relative_eq!(beach.dominant_proportion, 0.75, epsilon = 1e-12);
        assert_relative_eq!(beach.excluded_fraction(), 0.2, epsilon = 1e-12);

        assert_eq!(profile.samples[1].dominant.as_deref(), Some("fragment"));
        assert_eq!(profile.empty_samples(), vec!["empty"]);
        assert_eq!(profile.samples_below(30.0), vec!["river", "empty"]);
    }

    #[test]
    fn test_summary_statistics() {
        let profile = profile_samples(&create_test_table(), &[]);
        assert_eq!(profile.n_categories, 3);
        assert_eq!(profile.min_total, 4.0);
        assert_eq!(profile.max_total, 50.0);
        assert_eq!(profile.median_total, 20.0);
        assert_relative_eq!(profile.mean_total, 74.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display() {
        let profile = profile_samples(&create_test_table(), &["unknown".to_string()]);
        let text = profile.to_string();
        assert!(text.contains("Excluded:   unknown"));
        assert!(text.contains("beach"));
    }
}
