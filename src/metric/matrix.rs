//! Pairwise metric matrices across a sample set.

use super::Metric;
use crate::data::SampleSet;
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Raw scores of one metric for every pair of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMatrix {
    /// Metric used.
    pub metric: Metric,
    /// Sample names, in sample set order.
    pub names: Vec<String>,
    /// Symmetric N×N scores; the diagonal holds the metric's self-score.
    pub values: Vec<Vec<f64>>,
}

impl MetricMatrix {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Score between samples `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Scores converted to distance semantics (zero diagonal, non-negative).
    pub fn dissimilarities(&self) -> Vec<Vec<f64>> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &s)| if i == j { 0.0 } else { self.metric.to_dissimilarity(s) })
                    .collect()
            })
            .collect()
    }

    /// Write the matrix as TSV with sample names as header and first column.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{}", self.metric)?;
        for name in &self.names {
            write!(writer, "\t{}", name)?;
        }
        writeln!(writer)?;

        for (name, row) in self.names.iter().zip(&self.values) {
            write!(writer, "{}", name)?;
            for value in row {
                write!(writer, "\t{:.6}", value)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Score every pair of samples with one metric.
///
/// Only the upper triangle is computed; the lower triangle mirrors it, so the
/// matrix is exactly symmetric.
pub fn metric_matrix(samples: &SampleSet, metric: Metric) -> MetricMatrix {
    let n = samples.len();
    let dists = samples.samples();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| metric.score_normalized(dists[i].proportions(), dists[j].proportions()))
                .collect()
        })
        .collect();

    let mut values = vec![vec![metric.best_value(); n]; n];
    for (i, row) in upper.iter().enumerate() {
        for (offset, &score) in row.iter().enumerate() {
            let j = i + 1 + offset;
            values[i][j] = score;
            values[j][i] = score;
        }
    }

    MetricMatrix {
        metric,
        names: samples.names().into_iter().map(str::to_string).collect(),
        values,
    }
}

/// Pairwise matrices for every supported metric.
pub fn metric_matrices(samples: &SampleSet) -> Vec<MetricMatrix> {
    Metric::ALL
        .iter()
        .map(|&metric| metric_matrix(samples, metric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Distribution;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn create_test_set() -> SampleSet {
        let cats: Arc<[String]> = vec!["A".to_string(), "B".to_string(), "C".to_string()].into();
        SampleSet::new(vec![
            Distribution::from_counts("s1", Arc::clone(&cats), &[5.0, 3.0, 2.0]).unwrap(),
            Distribution::from_counts("s2", Arc::clone(&cats), &[1.0, 1.0, 8.0]).unwrap(),
            Distribution::from_counts("s3", cats, &[2.0, 6.0, 2.0]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_matrix_symmetric_with_best_diagonal() {
        let set = create_test_set();
        for m in metric_matrices(&set) {
            assert_eq!(m.len(), 3);
            for i in 0..3 {
                assert_eq!(m.get(i, i), m.metric.best_value());
                for j in 0..3 {
                    assert_eq!(m.get(i, j), m.get(j, i));
                }
            }
        }
    }

    #[test]
    fn test_matrix_matches_pairwise_score() {
        let set = create_test_set();
        let m = metric_matrix(&set, Metric::Likeness);
        let direct = Metric::Likeness
            .score(&set.samples()[0], &set.samples()[2])
            .unwrap();
        assert_relative_eq!(m.get(0, 2), direct, epsilon = 1e-15);
    }

    #[test]
    fn test_dissimilarities() {
        let set = create_test_set();
        let m = metric_matrix(&set, Metric::Similarity);
        let d = m.dissimilarities();
        for i in 0..3 {
            assert_eq!(d[i][i], 0.0);
            for j in 0..3 {
                assert!(d[i][j] >= 0.0);
            }
        }
        assert_relative_eq!(d[0][1], 1.0 - m.get(0, 1), epsilon = 1e-15);
    }
}
