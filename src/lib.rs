//! Source unmixing and ordination of categorical count distributions
//!
//! This library estimates how much each of several known "source"
//! compositions contributes to an observed "sink" mixture, and lays out many
//! compositions in a low-dimensional space that preserves their pairwise
//! dissimilarities. Typical inputs are particle-type counts per sampling site.
//!
//! # Overview
//!
//! - **data**: Count tables, category vectors, distributions, sample sets
//! - **normalize**: Total sum scaling with category exclusion and ordering
//! - **metric**: Six similarity/distance metrics and pairwise matrices
//! - **unmix**: Monte Carlo source unmixing on the simplex
//! - **mds**: Metric MDS (classical start + SMACOF) with Kruskal stress
//! - **profile**: Raw count profiling
//! - **pipeline**: YAML configuration, an analysis runner and one-pass reports
//!
//! # Example
//!
//! ```no_run
//! use sourcemix::prelude::*;
//!
//! let config = AnalysisConfig::default();
//! let analysis = Analysis::from_path("counts.tsv", config).unwrap().with_seed(42);
//!
//! let result = analysis
//!     .unmix("harbor", &["river", "beach"], Metric::Kuiper)
//!     .unwrap();
//! println!("{}", result);
//!
//! let layout = analysis.mds(Metric::Likeness).unwrap();
//! println!("{}", layout);
//! ```

pub mod data;
pub mod error;
pub mod mds;
pub mod metric;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod unmix;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        CategoryOrder, CategoryVector, CountTable, CumulativeDistribution, Distribution, SampleSet,
    };
    pub use crate::error::{MixError, Result};
    pub use crate::mds::{
        mds, mds_by_name, stress_interpretation, DissimilarityMatrix, MdsConfig, MdsInit,
        MdsPoint, MdsResult, StressQuality,
    };
    pub use crate::metric::{
        chi_squared, ks, kuiper, likeness, metric_matrices, metric_matrix, r2, similarity,
        Metric, MetricKind, MetricMatrix,
    };
    pub use crate::normalize::{norm_tss, norm_tss_table, TssConfig};
    pub use crate::pipeline::{Analysis, AnalysisConfig, AnalysisReport, AnalysisSteps};
    pub use crate::profile::{profile_samples, SampleProfile, TableProfile};
    pub use crate::unmix::{
        unmix, unmix_named, unmix_samples, SourceContribution, UnmixConfig, UnmixingResult,
    };
}
