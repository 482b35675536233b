//! Analysis configuration and execution over a loaded count table.

mod config;
mod report;
mod runner;

pub use config::AnalysisConfig;
pub use report::{AnalysisReport, AnalysisSteps, MetricMatrixSet, METRIC_MATRICES_FILE};
pub use runner::Analysis;
