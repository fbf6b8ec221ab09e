//! `[project]` section types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::optional_date;

/// Time axis the monitoring output is keyed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    #[default]
    SubmissionDate,
    BuildId,
}

/// Project-level settings. Every field is optional so that any layer can
/// set any subset of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Overrides the platform derived from experiment metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<XAxis>,
    #[serde(deserialize_with = "optional_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "optional_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Permanently exclude the project from scheduling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<bool>,
    /// Only meaningful on an override: suppress platform and rollout defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_default_metrics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_visualization: Option<bool>,
    /// Names of the metrics to compute. Unioned across layers; an explicit
    /// empty list clears what lower layers selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<String>>,
    pub population: PopulationSpec,
}

/// `[project.population]`: which clients are monitored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_pref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    /// Monitor every client instead of an experiment's enrollees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_entire_population: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by_dimension: Option<String>,
}

impl ProjectSpec {
    pub fn skips_default_metrics(&self) -> bool {
        self.skip_default_metrics.unwrap_or(false)
    }

    pub fn monitors_entire_population(&self) -> bool {
        self.population.monitor_entire_population.unwrap_or(false)
    }
}
