//! Result types for Monte Carlo unmixing.

use crate::data::Distribution;
use crate::error::Result;
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Estimated contribution of one source to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContribution {
    /// Source sample name.
    pub name: String,
    /// Mean weight over the retained trials (0-1).
    pub mean: f64,
    /// Population standard deviation of the weight over the retained trials.
    pub std_dev: f64,
    /// Lower percentile of the retained weights.
    pub lower: f64,
    /// Upper percentile of the retained weights.
    pub upper: f64,
}

impl fmt::Display for SourceContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1}% ± {:.1}% [{:.1}%, {:.1}%]",
            self.name,
            self.mean * 100.0,
            self.std_dev * 100.0,
            self.lower * 100.0,
            self.upper * 100.0
        )
    }
}

/// Outcome of one `unmix` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmixingResult {
    /// Sink sample name.
    pub sink: String,
    /// Metric used to score trials.
    pub metric: Metric,
    /// Per-source estimates, in source order.
    pub contributions: Vec<SourceContribution>,
    /// Percentile used for `lower` (0-100).
    pub lower_percentile: f64,
    /// Percentile used for `upper` (0-100).
    pub upper_percentile: f64,
    /// Score of the best trial.
    pub best_score: f64,
    /// Contribution vector of the best trial.
    pub best_weights: Vec<f64>,
    /// Reconstructed mixture of the best trial.
    pub best_mixture: Distribution,
    /// Reconstructed mixtures of the best retained trials, best first.
    pub top_mixtures: Vec<Distribution>,
    /// Number of trials run.
    pub n_trials: usize,
    /// Number of trials aggregated into the estimate.
    pub n_retained: usize,
    /// Base seed of the run (drawn from OS entropy when none was supplied).
    pub seed: u64,
}

impl UnmixingResult {
    /// Mean contribution per source.
    pub fn point_estimate(&self) -> Vec<f64> {
        self.contributions.iter().map(|c| c.mean).collect()
    }

    /// `(lower, upper)` interval per source.
    pub fn confidence_intervals(&self) -> Vec<(f64, f64)> {
        self.contributions.iter().map(|c| (c.lower, c.upper)).collect()
    }

    /// Look up a source's contribution by name.
    pub fn contribution(&self, name: &str) -> Option<&SourceContribution> {
        self.contributions.iter().find(|c| c.name == name)
    }

    /// Write the contribution table as TSV (percent units).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the contribution table as TSV to any writer.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "source\tcontribution_pct\tstd_dev_pct\tp{}_pct\tp{}_pct\tmetric",
            self.lower_percentile, self.upper_percentile
        )?;
        for c in &self.contributions {
            writeln!(
                writer,
                "{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{}",
                c.name,
                c.mean * 100.0,
                c.std_dev * 100.0,
                c.lower * 100.0,
                c.upper * 100.0,
                self.metric
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for UnmixingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unmixing of '{}' ({} metric)", self.sink, self.metric)?;
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(
            f,
            "Trials: {} (retained {}), seed {}",
            self.n_trials, self.n_retained, self.seed
        )?;
        writeln!(f, "Best fit score: {:.4}", self.best_score)?;
        for c in &self.contributions {
            writeln!(f, "  {}", c)?;
        }
        Ok(())
    }
}

/// Arithmetic mean; callers guarantee a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Empirical percentile with linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `p` is in [0, 100].
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_relative_eq!(percentile(&v, 5.0), 1.2, epsilon = 1e-12);
        assert_relative_eq!(percentile(&v, 95.0), 4.8, epsilon = 1e-12);
        assert_eq!(percentile(&[0.4], 5.0), 0.4);
    }

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&v);
        assert_eq!(m, 5.0);
        assert_eq!(std_dev(&v, m), 2.0);
    }

    #[test]
    fn test_contribution_display() {
        let c = SourceContribution {
            name: "river".to_string(),
            mean: 0.5,
            std_dev: 0.031,
            lower: 0.45,
            upper: 0.55,
        };
        assert_eq!(c.to_string(), "river: 50.0% ± 3.1% [45.0%, 55.0%]");
    }
}
