//! One-pass analysis: distributions, MDS and all-metric matrices together.

use crate::data::SampleSet;
use crate::error::Result;
use crate::mds::MdsResult;
use crate::metric::{Metric, MetricMatrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the combined metric matrix document.
pub const METRIC_MATRICES_FILE: &str = "metric_matrices.json";

/// Which parts of a full analysis to run.
///
/// ```yaml
/// distributions: true
/// mds: true
/// metrics: false
/// mds_metric: similarity
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSteps {
    /// Normalized and cumulative distribution tables.
    pub distributions: bool,
    /// MDS layout of every sample.
    pub mds: bool,
    /// Pairwise matrices for every metric.
    pub metrics: bool,
    /// Metric the MDS layout is computed with.
    pub mds_metric: Metric,
}

impl Default for AnalysisSteps {
    fn default() -> Self {
        Self::all()
    }
}

impl AnalysisSteps {
    /// Every step, MDS on the similarity metric.
    pub fn all() -> Self {
        Self {
            distributions: true,
            mds: true,
            metrics: true,
            mds_metric: Metric::Similarity,
        }
    }

    /// No step selected; enable the ones wanted field by field.
    pub fn none() -> Self {
        Self {
            distributions: false,
            mds: false,
            metrics: false,
            mds_metric: Metric::Similarity,
        }
    }

    /// Whether nothing would run.
    pub fn is_empty(&self) -> bool {
        !(self.distributions || self.mds || self.metrics)
    }
}

/// All metric matrices over one sample order, as written to
/// [`METRIC_MATRICES_FILE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMatrixSet {
    pub sample_names: Vec<String>,
    /// Metric name to N×N scores.
    pub metrics: BTreeMap<String, Vec<Vec<f64>>>,
}

impl MetricMatrixSet {
    /// Collect matrices that share one sample order.
    pub fn from_matrices(matrices: &[MetricMatrix]) -> Self {
        let sample_names = matrices
            .first()
            .map(|m| m.names.clone())
            .unwrap_or_default();
        let metrics = matrices
            .iter()
            .map(|m| (m.metric.name().to_string(), m.values.clone()))
            .collect();
        Self {
            sample_names,
            metrics,
        }
    }
}

/// Results of [`Analysis::run_all`](super::Analysis::run_all); skipped steps are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub distributions: Option<SampleSet>,
    pub mds: Option<MdsResult>,
    pub metrics: Option<Vec<MetricMatrix>>,
}

impl AnalysisReport {
    /// Write every computed part into `dir`, creating it if needed.
    ///
    /// Layout:
    /// - `distributions.tsv`, `cumulative.tsv`
    /// - `mds_{metric}.tsv`, `mds_{metric}_summary.txt`
    /// - `{metric}_matrix.tsv` per metric and [`METRIC_MATRICES_FILE`]
    ///
    /// Returns the written paths in that order.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        if let Some(samples) = &self.distributions {
            for (file, cumulative) in [("distributions.tsv", false), ("cumulative.tsv", true)] {
                let path = dir.join(file);
                let mut writer = BufWriter::new(File::create(&path)?);
                samples.write_tsv(&mut writer, cumulative)?;
                writer.flush()?;
                written.push(path);
            }
        }

        if let Some(layout) = &self.mds {
            let path = dir.join(format!("mds_{}.tsv", layout.metric));
            layout.to_tsv(&path)?;
            written.push(path);

            let path = dir.join(format!("mds_{}_summary.txt", layout.metric));
            std::fs::write(&path, layout.to_string())?;
            written.push(path);
        }

        if let Some(matrices) = &self.metrics {
            for matrix in matrices {
                let path = dir.join(format!("{}_matrix.tsv", matrix.metric));
                matrix.to_tsv(&path)?;
                written.push(path);
            }

            let path = dir.join(METRIC_MATRICES_FILE);
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &MetricMatrixSet::from_matrices(matrices))?;
            writer.flush()?;
            written.push(path);
        }

        Ok(written)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Report")?;
        writeln!(f, "===============")?;
        if let Some(samples) = &self.distributions {
            writeln!(
                f,
                "Distributions: {} samples over {} categories",
                samples.len(),
                samples.categories().len()
            )?;
        }
        if let Some(layout) = &self.mds {
            writeln!(
                f,
                "MDS ({}): stress {:.4} ({}), {} iterations{}",
                layout.metric,
                layout.stress,
                layout.quality(),
                layout.iterations,
                if layout.converged { "" } else { ", not converged" }
            )?;
        }
        if let Some(matrices) = &self.metrics {
            let names: Vec<&str> = matrices.iter().map(|m| m.metric.name()).collect();
            writeln!(f, "Metric matrices: {}", names.join(", "))?;
        }
        Ok(())
    }
}
