//! Metric MDS over a sample set.

use super::classical::{classical_scaling, random_configuration};
use super::dissimilarity::DissimilarityMatrix;
use super::result::{MdsPoint, MdsResult};
use super::smacof::smacof;
use crate::data::SampleSet;
use crate::error::{MixError, Result};
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Seed used when the classical start collapses and a random restart is needed.
const FALLBACK_SEED: u64 = 0x5EED;

/// How the SMACOF iterations are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MdsInit {
    /// Torgerson scaling of the dissimilarities.
    #[default]
    Classical,
    /// Uniform random coordinates from a fixed seed.
    Random { seed: u64 },
}

/// Configuration for MDS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdsConfig {
    /// Embedding dimensionality.
    pub dimensions: usize,
    /// Maximum Guttman transforms.
    pub max_iterations: usize,
    /// Stop once the relative stress improvement falls below this.
    pub tolerance: f64,
    pub init: MdsInit,
}

impl Default for MdsConfig {
    fn default() -> Self {
        Self {
            dimensions: 2,
            max_iterations: 300,
            tolerance: 1e-6,
            init: MdsInit::Classical,
        }
    }
}

impl MdsConfig {
    /// A 3-D layout with the default iteration budget.
    pub fn three_dimensional() -> Self {
        Self {
            dimensions: 3,
            ..Default::default()
        }
    }

    /// Larger iteration budget and tighter tolerance.
    pub fn thorough() -> Self {
        Self {
            max_iterations: 3000,
            tolerance: 1e-9,
            ..Default::default()
        }
    }

    /// Check option ranges against a sample count.
    pub fn validate(&self, n_samples: usize) -> Result<()> {
        if self.dimensions == 0 || self.dimensions >= n_samples {
            return Err(MixError::Configuration(format!(
                "dimensions must be in [1, {}] for {} samples, got {}",
                n_samples.saturating_sub(1),
                n_samples,
                self.dimensions
            )));
        }
        if self.max_iterations == 0 {
            return Err(MixError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MixError::Configuration(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Embed the samples so that Euclidean distances approximate the metric's
/// pairwise dissimilarities.
///
/// Fails with `InvalidInput` for fewer than three samples and with
/// `Configuration` for out-of-range options. Non-convergence within the
/// iteration budget is reported through `converged`, not as an error.
pub fn mds(samples: &SampleSet, metric: Metric, config: &MdsConfig) -> Result<MdsResult> {
    let n = samples.len();
    if n < 3 {
        return Err(MixError::InvalidInput(format!(
            "MDS requires at least 3 samples, got {}",
            n
        )));
    }
    config.validate(n)?;

    info!(
        samples = n,
        dimensions = config.dimensions,
        %metric,
        "running metric MDS"
    );

    let dissimilarity = DissimilarityMatrix::from_samples(samples, metric);
    let delta = dissimilarity.to_matrix();
    let max_delta = delta.iter().copied().fold(0.0, f64::max);

    let init = match config.init {
        MdsInit::Classical => {
            let start = classical_scaling(&delta, config.dimensions);
            if max_delta > 0.0 && start.iter().all(|v| v.abs() < 1e-12) {
                debug!("classical start collapsed, using random start");
                random_configuration(n, config.dimensions, max_delta, FALLBACK_SEED)
            } else {
                start
            }
        }
        MdsInit::Random { seed } => random_configuration(n, config.dimensions, max_delta, seed),
    };

    let outcome = smacof(&delta, init, config.max_iterations, config.tolerance);
    let norm = dissimilarity.sum_of_squares();
    let stress = if norm > 0.0 {
        (outcome.raw_stress / norm).sqrt()
    } else {
        0.0
    };

    if outcome.converged {
        info!(stress, iterations = outcome.iterations, "MDS complete");
    } else {
        warn!(
            stress,
            iterations = outcome.iterations,
            "MDS did not converge within the iteration budget"
        );
    }

    let points = (0..n)
        .map(|i| MdsPoint {
            name: dissimilarity.names[i].clone(),
            coordinates: outcome.coordinates.row(i).iter().copied().collect(),
            nearest_neighbor: dissimilarity
                .nearest_neighbor(i)
                .map(|j| dissimilarity.names[j].clone()),
        })
        .collect();

    Ok(MdsResult {
        metric,
        points,
        stress,
        raw_stress: outcome.raw_stress,
        iterations: outcome.iterations,
        converged: outcome.converged,
        dissimilarity,
    })
}

/// [`mds`] with the metric given by name.
pub fn mds_by_name(samples: &SampleSet, metric_name: &str, config: &MdsConfig) -> Result<MdsResult> {
    let metric: Metric = metric_name.parse()?;
    mds(samples, metric, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Distribution;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn one_hot_set(n: usize) -> SampleSet {
        let cats: Arc<[String]> = (0..n).map(|i| format!("c{}", i)).collect();
        let samples = (0..n)
            .map(|i| {
                let mut counts = vec![0.0; n];
                counts[i] = 10.0;
                Distribution::from_counts(format!("s{}", i), Arc::clone(&cats), &counts).unwrap()
            })
            .collect();
        SampleSet::new(samples).unwrap()
    }

    fn create_gradient_set() -> SampleSet {
        let cats: Arc<[String]> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let rows: [[f64; 4]; 6] = [
            [9.0, 1.0, 0.0, 0.0],
            [6.0, 3.0, 1.0, 0.0],
            [3.0, 4.0, 2.0, 1.0],
            [1.0, 3.0, 4.0, 2.0],
            [0.0, 1.0, 4.0, 5.0],
            [0.0, 0.0, 2.0, 8.0],
        ];
        let samples = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Distribution::from_counts(format!("site{}", i + 1), Arc::clone(&cats), r).unwrap())
            .collect();
        SampleSet::new(samples).unwrap()
    }

    #[test]
    fn test_equilateral_one_hot() {
        let set = one_hot_set(3);
        for metric in Metric::ALL {
            let result = mds(&set, metric, &MdsConfig::default()).unwrap();
            assert!(result.stress < 1e-6, "{}: stress {}", metric, result.stress);
            let d01 = result.embedded_distance(0, 1);
            assert_relative_eq!(result.embedded_distance(1, 2), d01, epsilon = 1e-6);
            assert_relative_eq!(result.embedded_distance(0, 2), d01, epsilon = 1e-6);
            assert_relative_eq!(d01, result.dissimilarity.get(0, 1), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tetrahedron_in_three_dimensions() {
        let set = one_hot_set(4);
        let result = mds(&set, Metric::Likeness, &MdsConfig::three_dimensional()).unwrap();
        assert_eq!(result.dimensions(), 3);
        assert!(result.stress < 1e-6);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_relative_eq!(result.embedded_distance(i, j), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_iterations_do_not_increase_stress() {
        let set = one_hot_set(4);
        let short = MdsConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let first = mds(&set, Metric::Likeness, &short).unwrap();
        let full = mds(&set, Metric::Likeness, &MdsConfig::default()).unwrap();
        assert!(full.stress <= first.stress + 1e-12);
        assert!(full.stress > 0.0);
        assert!(full.iterations <= 300);
    }

    #[test]
    fn test_gradient_preserves_ordering() {
        let set = create_gradient_set();
        let result = mds(&set, Metric::Kuiper, &MdsConfig::default()).unwrap();
        assert_eq!(result.len(), 6);
        assert_eq!(result.points[0].name, "site1");
        // Ends of the gradient are farther apart than neighbours.
        assert!(result.embedded_distance(0, 5) > result.embedded_distance(0, 1));
        assert!(result.stress < 0.2);
        assert_eq!(result.points[0].nearest_neighbor.as_deref(), Some("site2"));
    }

    #[test]
    fn test_random_init_seeded() {
        let set = create_gradient_set();
        let config = MdsConfig {
            init: MdsInit::Random { seed: 17 },
            ..Default::default()
        };
        let a = mds(&set, Metric::Ks, &config).unwrap();
        let b = mds(&set, Metric::Ks, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_samples_terminate() {
        let cats: Arc<[String]> = vec!["x".to_string(), "y".to_string()].into();
        let set = SampleSet::new(
            (0..4)
                .map(|i| Distribution::from_counts(format!("s{}", i), Arc::clone(&cats), &[1.0, 1.0]).unwrap())
                .collect(),
        )
        .unwrap();
        let result = mds(&set, Metric::ChiSquared, &MdsConfig::default()).unwrap();
        assert_eq!(result.stress, 0.0);
        assert!(result.converged);
        assert!(result.coordinates().iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_two_samples_rejected() {
        let set = one_hot_set(2);
        let err = mds(&set, Metric::R2, &MdsConfig::default()).unwrap_err();
        assert!(matches!(err, MixError::InvalidInput(_)));
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        let set = one_hot_set(3);
        for dimensions in [0, 3] {
            let config = MdsConfig {
                dimensions,
                ..Default::default()
            };
            let err = mds(&set, Metric::R2, &config).unwrap_err();
            assert!(matches!(err, MixError::Configuration(_)));
        }
    }

    #[test]
    fn test_unknown_metric_name() {
        let set = one_hot_set(3);
        let err = mds_by_name(&set, "bray_curtis", &MdsConfig::default()).unwrap_err();
        assert!(matches!(err, MixError::UnknownMetric(_)));
        assert!(mds_by_name(&set, "kuiper", &MdsConfig::default()).is_ok());
    }

    #[test]
    fn test_config_yaml_init() {
        let config: MdsConfig = serde_yaml::from_str("dimensions: 3\ninit:\n  method: random\n  seed: 5\n").unwrap();
        assert_eq!(config.dimensions, 3);
        assert_eq!(config.init, MdsInit::Random { seed: 5 });
        assert_eq!(config.max_iterations, 300);
    }
}
