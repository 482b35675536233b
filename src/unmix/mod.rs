//! Source unmixing: estimate the fraction each source contributes to a sink.
//!
//! The sink is modeled as a convex combination of the source distributions.
//! Contribution vectors are sampled uniformly from the simplex and scored with
//! a [`Metric`](crate::metric::Metric); the best-scoring trials are aggregated
//! into per-source estimates with percentile intervals.

mod engine;
mod result;
pub mod simplex;

pub use engine::{unmix, unmix_named, unmix_samples, UnmixConfig};
pub use result::{SourceContribution, UnmixingResult};
