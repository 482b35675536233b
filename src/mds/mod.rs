//! Metric multidimensional scaling.
//!
//! Pairwise dissimilarities come from any [`Metric`](crate::metric::Metric)
//! converted to distance semantics. A classical (Torgerson) start is refined
//! with SMACOF, and the fit is reported as Kruskal stress-1:
//!
//! ```text
//! stress = sqrt( Σ_{i<j} (δ_ij - d_ij)² / Σ_{i<j} δ_ij² )
//! ```

pub mod classical;
mod dissimilarity;
mod engine;
mod result;
pub mod smacof;

pub use dissimilarity::DissimilarityMatrix;
pub use engine::{mds, mds_by_name, MdsConfig, MdsInit};
pub use result::{stress_interpretation, MdsPoint, MdsResult, StressQuality};
