//! The full fragment document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::definitions::{DataSourceDefinition, DimensionDefinition, MetricDefinition};
use super::project::ProjectSpec;

/// One fragment's content. Also the shape of a merged spec.
///
/// Maps are ordered so that merging and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitoringSpec {
    pub project: ProjectSpec,
    pub metrics: BTreeMap<String, MetricDefinition>,
    pub data_sources: BTreeMap<String, DataSourceDefinition>,
    pub dimensions: BTreeMap<String, DimensionDefinition>,
}

impl MonitoringSpec {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
