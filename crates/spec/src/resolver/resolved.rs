//! Resolved configuration types.
//!
//! A [`ResolvedConfiguration`] has one effective value per field and every
//! reference replaced by the referenced definition. It only hands out shared
//! references, so once built it cannot change.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::{MetricType, XAxis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    project: ProjectConfiguration,
    metrics: Vec<MetricConfiguration>,
    dimensions: Vec<DimensionConfiguration>,
}

impl ResolvedConfiguration {
    pub(crate) fn new(
        project: ProjectConfiguration,
        metrics: Vec<MetricConfiguration>,
        dimensions: Vec<DimensionConfiguration>,
    ) -> Self {
        Self {
            project,
            metrics,
            dimensions,
        }
    }

    pub fn project(&self) -> &ProjectConfiguration {
        &self.project
    }

    /// Selected metrics, in selection order.
    pub fn metrics(&self) -> &[MetricConfiguration] {
        &self.metrics
    }

    /// Population dimensions, in declaration order.
    pub fn dimensions(&self) -> &[DimensionConfiguration] {
        &self.dimensions
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.project.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.project.end_date
    }

    pub fn skip(&self) -> bool {
        self.project.skip
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    pub name: String,
    pub platform: String,
    pub is_rollout: bool,
    pub xaxis: XAxis,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub skip: bool,
    pub compact_visualization: bool,
    pub population: PopulationConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfiguration {
    pub data_source: Option<DataSourceConfiguration>,
    pub boolean_pref: Option<String>,
    pub channel: Option<String>,
    pub branches: Vec<String>,
    pub monitor_entire_population: bool,
    pub group_by_dimension: Option<DimensionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfiguration {
    pub name: String,
    pub select_expression: String,
    pub data_source: DataSourceConfiguration,
    pub kind: MetricType,
    pub friendly_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub statistics: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfiguration {
    pub name: String,
    pub from_expression: String,
    pub submission_date_column: String,
    pub client_id_column: String,
    pub build_id_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfiguration {
    pub name: String,
    pub select_expression: String,
    pub data_source: DataSourceConfiguration,
    pub friendly_name: Option<String>,
}
