//! Experiment and rollout metadata used to classify projects.
//!
//! The metadata service itself is external; this module reads a JSON
//! snapshot of its output and exposes it through [`ExperimentLookup`].

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Lifecycle status reported by the metadata service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    Draft,
    Preview,
    #[default]
    Live,
    Complete,
}

/// One experiment or rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub experimenter_slug: Option<String>,
    pub normandy_slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub is_rollout: bool,
    #[serde(default)]
    pub status: ExperimentStatus,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub branches: Vec<String>,
}

impl Experiment {
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.normandy_slug == slug || self.experimenter_slug.as_deref() == Some(slug)
    }
}

/// Classification lookup keyed by slug.
pub trait ExperimentLookup: Send + Sync {
    /// Find by experimenter or normandy slug.
    fn with_slug(&self, slug: &str) -> Option<&Experiment>;

    /// All rollouts known to the service.
    fn rollouts(&self) -> Vec<&Experiment>;
}

/// Errors reading an experiment snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory collection backed by a JSON array of [`Experiment`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentCollection {
    experiments: Vec<Experiment>,
}

impl ExperimentCollection {
    pub fn new(experiments: Vec<Experiment>) -> Self {
        Self { experiments }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ExperimentError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ExperimentError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Like [`from_json_file`](Self::from_json_file), but a missing file
    /// yields an empty collection. Every project then classifies with the
    /// default platform and no rollout flag.
    pub fn load_or_empty(path: &Path) -> Result<Self, ExperimentError> {
        if !path.exists() {
            warn!(path = %path.display(), "experiment snapshot not found, continuing without experiment metadata");
            return Ok(Self::default());
        }
        let collection = Self::from_json_file(path)?;
        info!(path = %path.display(), experiments = collection.len(), "loaded experiment snapshot");
        Ok(collection)
    }

    /// Drop experiments that were never launched.
    pub fn ever_launched(self) -> Self {
        Self::new(
            self.experiments
                .into_iter()
                .filter(|e| e.status != ExperimentStatus::Draft)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

impl ExperimentLookup for ExperimentCollection {
    fn with_slug(&self, slug: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.matches_slug(slug))
    }

    fn rollouts(&self) -> Vec<&Experiment> {
        self.experiments.iter().filter(|e| e.is_rollout).collect()
    }
}
