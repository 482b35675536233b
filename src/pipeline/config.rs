//! YAML-backed analysis configuration.

use crate::error::{MixError, Result};
use crate::mds::MdsConfig;
use crate::normalize::TssConfig;
use crate::unmix::UnmixConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything an analysis needs besides the data and the metric.
///
/// ```yaml
/// exclude: [unknown]
/// category_order: as_given
/// unmix:
///   trials: 5000
///   retain_fraction: 0.01
///   seed: 42
/// mds:
///   dimensions: 2
///   init:
///     method: classical
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Category exclusion and ordering.
    #[serde(flatten)]
    pub normalize: TssConfig,
    pub unmix: UnmixConfig,
    pub mds: MdsConfig,
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(MixError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(MixError::from)
    }

    /// Load from a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Validate the engine sections that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        self.unmix.validate()?;
        if self.mds.dimensions == 0 {
            return Err(MixError::Configuration(
                "mds.dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
