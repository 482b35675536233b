//! Data structures for categorical composition analysis.

mod category_vector;
mod count_table;
mod distribution;
mod sample_set;

pub use category_vector::{CategoryOrder, CategoryVector};
pub use count_table::CountTable;
pub use distribution::{CumulativeDistribution, Distribution, PROPORTION_TOLERANCE};
pub use sample_set::SampleSet;

pub(crate) use distribution::mix_into;
