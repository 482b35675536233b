//! Profiling of raw count tables before normalization.

mod sample;

pub use sample::{profile_samples, SampleProfile, TableProfile};
