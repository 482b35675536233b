//! Analysis runner: load counts once, then unmix or ordinate on demand.

use super::config::AnalysisConfig;
use super::report::{AnalysisReport, AnalysisSteps};
use crate::data::{CountTable, SampleSet};
use crate::error::{MixError, Result};
use crate::mds::{mds, MdsResult};
use crate::metric::{metric_matrices, Metric, MetricMatrix};
use crate::normalize::norm_tss_table;
use crate::profile::{profile_samples, TableProfile};
use crate::unmix::{unmix_named, UnmixingResult};
use std::path::Path;
use tracing::{debug, info};

/// A normalized sample set bound to an [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    samples: SampleSet,
    profile: TableProfile,
}

impl Analysis {
    /// Profile and normalize a count table.
    pub fn from_table(table: &CountTable, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let profile = profile_samples(table, &config.normalize.exclude);
        let samples = norm_tss_table(table, &config.normalize)?;
        info!(
            samples = samples.len(),
            categories = samples.categories().len(),
            "loaded sample set"
        );
        debug!(categories = ?samples.categories(), "category order");
        Ok(Self {
            config,
            samples,
            profile,
        })
    }

    /// Load a TSV/CSV count table and normalize it.
    pub fn from_path<P: AsRef<Path>>(path: P, config: AnalysisConfig) -> Result<Self> {
        let table = CountTable::from_path(path)?;
        Self::from_table(&table, config)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Normalized samples.
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    /// Raw count profile taken before normalization.
    pub fn profile(&self) -> &TableProfile {
        &self.profile
    }

    /// Builder-style override of the unmixing seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.unmix.seed = Some(seed);
        self
    }

    /// Unmix a named sink against named sources.
    pub fn unmix(&self, sink: &str, sources: &[&str], metric: Metric) -> Result<UnmixingResult> {
        unmix_named(&self.samples, sink, sources, metric, &self.config.unmix)
    }

    /// MDS layout of every sample.
    pub fn mds(&self, metric: Metric) -> Result<MdsResult> {
        mds(&self.samples, metric, &self.config.mds)
    }

    /// Pairwise matrices for every metric.
    pub fn metric_matrices(&self) -> Vec<MetricMatrix> {
        metric_matrices(&self.samples)
    }

    /// Run the selected steps in one pass.
    ///
    /// Fails with `Configuration` when no step is selected; a failing step
    /// aborts the run.
    pub fn run_all(&self, steps: &AnalysisSteps) -> Result<AnalysisReport> {
        if steps.is_empty() {
            return Err(MixError::Configuration(
                "no analysis step selected (distributions, mds, metrics)".to_string(),
            ));
        }

        let distributions = steps.distributions.then(|| self.samples.clone());
        if distributions.is_some() {
            debug!("distribution tables ready");
        }

        let mds = if steps.mds {
            info!(metric = %steps.mds_metric, "running MDS");
            Some(self.mds(steps.mds_metric)?)
        } else {
            None
        };

        let metrics = steps.metrics.then(|| {
            info!(samples = self.samples.len(), "computing metric matrices");
            self.metric_matrices()
        });

        Ok(AnalysisReport {
            distributions,
            mds,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unmix::UnmixConfig;

    fn create_test_table() -> CountTable {
        CountTable::new(
            vec!["river".into(), "beach".into(), "harbor".into(), "mix".into()],
            vec!["fiber".into(), "fragment".into(), "film".into(), "unknown".into()],
            vec![
                vec![80.0, 10.0, 10.0, 3.0],
                vec![10.0, 80.0, 10.0, 0.0],
                vec![10.0, 10.0, 80.0, 7.0],
                vec![45.0, 45.0, 10.0, 1.0],
            ],
        )
        .unwrap()
    }

    fn quick_config() -> AnalysisConfig {
        AnalysisConfig {
            unmix: UnmixConfig::quick().with_seed(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_table_excludes_unknown() {
        let analysis = Analysis::from_table(&create_test_table(), quick_config()).unwrap();
        assert_eq!(analysis.samples().categories(), &["fiber", "fragment", "film"]);
        assert_eq!(analysis.profile().samples[0].excluded, 3.0);
    }

    #[test]
    fn test_unmix_by_name() {
        let analysis = Analysis::from_table(&create_test_table(), quick_config()).unwrap();
        let result = analysis.unmix("mix", &["river", "beach"], Metric::Likeness).unwrap();
        assert_eq!(result.sink, "mix");
        assert!((result.contributions[0].mean - 0.5).abs() < 0.1);

        let err = analysis.unmix("mix", &["lake", "beach"], Metric::Likeness).unwrap_err();
        assert!(matches!(err, MixError::InvalidInput(_)));

        let err = analysis.unmix("mix", &["river", "river"], Metric::Likeness).unwrap_err();
        assert!(matches!(err, MixError::Configuration(_)));
    }

    #[test]
    fn test_mds_and_matrices() {
        let analysis = Analysis::from_table(&create_test_table(), quick_config()).unwrap();
        let layout = analysis.mds(Metric::Similarity).unwrap();
        assert_eq!(layout.len(), 4);
        assert_eq!(analysis.metric_matrices().len(), Metric::ALL.len());
    }

    #[test]
    fn test_run_all_selected_steps() {
        let analysis = Analysis::from_table(&create_test_table(), quick_config()).unwrap();

        let report = analysis.run_all(&AnalysisSteps::all()).unwrap();
        assert_eq!(report.distributions.as_ref().map(|s| s.len()), Some(4));
        assert_eq!(report.mds.as_ref().map(|m| m.metric), Some(Metric::Similarity));
        assert_eq!(report.metrics.as_ref().map(|m| m.len()), Some(Metric::ALL.len()));

        let steps = AnalysisSteps {
            mds: true,
            mds_metric: Metric::Ks,
            ..AnalysisSteps::none()
        };
        let report = analysis.run_all(&steps).unwrap();
        assert!(report.distributions.is_none() && report.metrics.is_none());
        assert_eq!(report.mds.map(|m| m.metric), Some(Metric::Ks));

        let err = analysis.run_all(&AnalysisSteps::none()).unwrap_err();
        assert!(matches!(err, MixError::Configuration(_)));
    }

    #[test]
    fn test_seed_override() {
        let analysis = Analysis::from_table(&create_test_table(), AnalysisConfig::default())
            .unwrap()
            .with_seed(9);
        assert_eq!(analysis.config().unmix.seed, Some(9));
    }
}
