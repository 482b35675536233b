//! Normalization of raw category counts into comparable distributions.

pub mod tss;

pub use tss::{norm_tss, norm_tss_table, TssConfig};
