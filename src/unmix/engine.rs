//! Monte Carlo estimation of source contributions to a sink.
//!
//! # Algorithm
//!
//! 1. Draw `trials` contribution vectors uniformly from the simplex
//! 2. For each vector, mix the sources and score the mixture against the sink
//! 3. Rank trials best first (ties broken by total variation, then trial index)
//! 4. Aggregate the retained top fraction into mean, spread, and percentiles
//!
//! Trials are independent and each one seeds its own RNG from the run seed and
//! its index, so a seeded run returns the same result whether it runs on one
//! thread or many.
//!
//! # Example
//!
//! ```ignore
//! use sourcemix::unmix::{unmix, UnmixConfig};
//! use sourcemix::metric::Metric;
//!
//! let config = UnmixConfig::default().with_seed(42);
//! let result = unmix(&sink, &sources, Metric::Kuiper, &config)?;
//! println!("{}", result);
//! ```

use super::result::{mean, percentile, std_dev, SourceContribution, UnmixingResult};
use super::simplex::{entropy_seed, sample_simplex, trial_rng};
use crate::data::{mix_into, Distribution, SampleSet};
use crate::error::{MixError, Result};
use crate::metric::Metric;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Configuration for Monte Carlo unmixing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnmixConfig {
    /// Number of random contribution vectors to score.
    pub trials: usize,
    /// Fraction of trials (best first) aggregated into the estimate.
    pub retain_fraction: f64,
    /// Lower bound on the number of retained trials.
    pub min_retained: usize,
    /// Percentile reported as the lower interval bound (0-100).
    pub lower_percentile: f64,
    /// Percentile reported as the upper interval bound (0-100).
    pub upper_percentile: f64,
    /// Number of best mixtures reconstructed in the result.
    pub keep_mixtures: usize,
    /// Random seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Score trials on the rayon pool.
    pub parallel: bool,
}

impl Default for UnmixConfig {
    fn default() -> Self {
        Self {
            trials: 5000,
            retain_fraction: 0.01,
            min_retained: 10,
            lower_percentile: 5.0,
            upper_percentile: 95.0,
            keep_mixtures: 10,
            seed: None,
            parallel: true,
        }
    }
}

impl UnmixConfig {
    /// Fewer trials, for exploration and tests.
    pub fn quick() -> Self {
        Self {
            trials: 1000,
            ..Default::default()
        }
    }

    /// More trials and a tighter retained fraction.
    pub fn thorough() -> Self {
        Self {
            trials: 50_000,
            retain_fraction: 0.005,
            ..Default::default()
        }
    }

    /// Builder-style seed setter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check option ranges.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(MixError::Configuration(
                "trials must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retain_fraction) {
            return Err(MixError::Configuration(format!(
                "retain_fraction must be in [0, 1], got {}",
                self.retain_fraction
            )));
        }
        let pct = 0.0..=100.0;
        if !pct.contains(&self.lower_percentile) || !pct.contains(&self.upper_percentile) {
            return Err(MixError::Configuration(format!(
                "percentiles must be in [0, 100], got {} and {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        if self.lower_percentile > self.upper_percentile {
            return Err(MixError::Configuration(format!(
                "lower percentile {} exceeds upper percentile {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        Ok(())
    }

    /// Number of trials aggregated for a run of `self.trials`.
    pub fn n_retained(&self) -> usize {
        let by_fraction = (self.retain_fraction * self.trials as f64).ceil() as usize;
        by_fraction.max(self.min_retained).clamp(1, self.trials.max(1))
    }
}

/// One scored contribution vector.
struct Trial {
    index: usize,
    weights: Vec<f64>,
    score: f64,
    mismatch: f64,
}

fn run_trial(
    index: usize,
    base_seed: u64,
    sink: &Distribution,
    sources: &[Distribution],
    metric: Metric,
) -> Trial {
    let mut rng = trial_rng(base_seed, index as u64);
    let weights = sample_simplex(&mut rng, sources.len());

    let mut mixture = vec![0.0; sink.len()];
    mix_into(sources, &weights, &mut mixture);

    let score = metric.score_normalized(sink.proportions(), &mixture);
    let mismatch = sink
        .proportions()
        .iter()
        .zip(&mixture)
        .map(|(a, b)| (a - b).abs())
        .sum();

    Trial {
        index,
        weights,
        score,
        mismatch,
    }
}

/// Estimate how much each source contributes to `sink`.
///
/// Fails with `Configuration` for fewer than two sources or out-of-range
/// options, and with `InvalidInput` when any source's category order differs
/// from the sink's.
pub fn unmix(
    sink: &Distribution,
    sources: &[Distribution],
    metric: Metric,
    config: &UnmixConfig,
) -> Result<UnmixingResult> {
    if sources.len() < 2 {
        return Err(MixError::Configuration(format!(
            "unmixing requires at least two sources, got {}",
            sources.len()
        )));
    }
    config.validate()?;
    for source in sources {
        sink.ensure_aligned(source)?;
    }

    let seed = config.seed.unwrap_or_else(entropy_seed);
    let n_trials = config.trials;
    info!(
        sink = sink.name(),
        sources = sources.len(),
        trials = n_trials,
        %metric,
        seed,
        "running Monte Carlo unmixing"
    );

    let trials: Vec<Trial> = if config.parallel {
        (0..n_trials)
            .into_par_iter()
            .map(|i| run_trial(i, seed, sink, sources, metric))
            .collect()
    } else {
        (0..n_trials)
            .map(|i| run_trial(i, seed, sink, sources, metric))
            .collect()
    };

    let mut ranked: Vec<&Trial> = trials.iter().collect();
    ranked.sort_by(|a, b| {
        metric
            .compare(a.score, b.score)
            .then(a.mismatch.total_cmp(&b.mismatch))
            .then(a.index.cmp(&b.index))
    });

    let n_retained = config.n_retained();
    let retained = &ranked[..n_retained];
    debug!(
        n_retained,
        worst_retained = retained[n_retained - 1].score,
        "retained best trials"
    );

    let contributions: Vec<SourceContribution> = sources
        .iter()
        .enumerate()
        .map(|(j, source)| {
            let mut column: Vec<f64> = retained.iter().map(|t| t.weights[j]).collect();
            let m = mean(&column);
            let sd = std_dev(&column, m);
            column.sort_by(f64::total_cmp);
            SourceContribution {
                name: source.name().to_string(),
                mean: m,
                std_dev: sd,
                lower: percentile(&column, config.lower_percentile),
                upper: percentile(&column, config.upper_percentile),
            }
        })
        .collect();

    let best = retained[0];
    let best_mixture =
        Distribution::mixture(format!("{}_best_fit", sink.name()), sources, &best.weights)?;
    let top_mixtures = retained
        .iter()
        .take(config.keep_mixtures)
        .enumerate()
        .map(|(rank, t)| {
            Distribution::mixture(
                format!("{}_model_{}", sink.name(), rank + 1),
                sources,
                &t.weights,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    for c in &contributions {
        debug!(source = %c.name, mean = c.mean, std_dev = c.std_dev, "contribution");
    }
    info!(
        sink = sink.name(),
        best_score = best.score,
        n_retained,
        "unmixing complete"
    );

    Ok(UnmixingResult {
        sink: sink.name().to_string(),
        metric,
        contributions,
        lower_percentile: config.lower_percentile,
        upper_percentile: config.upper_percentile,
        best_score: best.score,
        best_weights: best.weights.clone(),
        best_mixture,
        top_mixtures,
        n_trials,
        n_retained,
        seed,
    })
}

/// Unmix a named sink against named sources from one sample set.
///
/// The metric is given by name (see [`Metric`]'s `FromStr`), so unknown names
/// surface as `UnknownMetric`.
pub fn unmix_samples(
    samples: &SampleSet,
    sink_name: &str,
    source_names: &[&str],
    metric_name: &str,
    config: &UnmixConfig,
) -> Result<UnmixingResult> {
    let metric: Metric = metric_name.parse()?;
    unmix_named(samples, sink_name, source_names, metric, config)
}

/// Like [`unmix_samples`] with an already parsed metric.
///
/// Missing names fail with `InvalidInput`; a source listed twice fails with
/// `Configuration`.
pub fn unmix_named(
    samples: &SampleSet,
    sink_name: &str,
    source_names: &[&str],
    metric: Metric,
    config: &UnmixConfig,
) -> Result<UnmixingResult> {
    let sink = samples.require(sink_name)?;

    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(source_names.len());
    for &name in source_names {
        if !seen.insert(name) {
            return Err(MixError::Configuration(format!(
                "source '{}' listed more than once",
                name
            )));
        }
        sources.push(samples.require(name)?.clone());
    }

    unmix(sink, &sources, metric, config)
}
