//! Pairwise dissimilarity matrices for MDS.

use crate::data::SampleSet;
use crate::metric::{metric_matrix, Metric};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Symmetric, non-negative N×N dissimilarities with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissimilarityMatrix {
    /// Metric the dissimilarities were derived from.
    pub metric: Metric,
    /// Sample names, in sample set order.
    pub names: Vec<String>,
    /// Row-major values.
    pub values: Vec<Vec<f64>>,
}

impl DissimilarityMatrix {
    /// Score every pair of samples and convert to distance semantics.
    pub fn from_samples(samples: &SampleSet, metric: Metric) -> Self {
        let scores = metric_matrix(samples, metric);
        let values = scores.dissimilarities();
        Self {
            metric,
            names: scores.names,
            values,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Sum of squared dissimilarities over the upper triangle.
    pub fn sum_of_squares(&self) -> f64 {
        let n = self.len();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| self.values[i][j].powi(2))
            .sum()
    }

    /// Index of the least dissimilar other sample (first on ties).
    pub fn nearest_neighbor(&self, i: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (j, &d) in self.values[i].iter().enumerate() {
            if j == i {
                continue;
            }
            match best {
                Some(b) if self.values[i][b] <= d => {}
                _ => best = Some(j),
            }
        }
        best
    }

    pub(crate) fn to_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        DMatrix::from_fn(n, n, |i, j| self.values[i][j])
    }
}
