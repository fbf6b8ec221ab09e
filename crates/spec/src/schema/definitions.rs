//! Named entries: `[metrics.*]`, `[data_sources.*]`, `[dimensions.*]`.
//!
//! Entries are replaced as a whole when a later layer defines the same name,
//! so required fields are not optional here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a metric's values are aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[default]
    Scalar,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDefinition {
    pub select_expression: String,
    /// Name of a `[data_sources.*]` entry.
    pub data_source: String,
    #[serde(default, rename = "type")]
    pub kind: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Statistic name -> parameters, e.g. `percentile = { percentiles = [50, 90] }`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub statistics: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSourceDefinition {
    pub from_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionDefinition {
    pub select_expression: String,
    /// Name of a `[data_sources.*]` entry.
    pub data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
