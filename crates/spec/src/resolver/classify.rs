use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;
use crate::schema::MonitoringSpec;

/// Platform used when neither the override nor the experiment names one.
pub const DEFAULT_PLATFORM: &str = "firefox_desktop";

/// Per-project classification that picks the layers to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub platform: String,
    pub is_rollout: bool,
}

impl Classification {
    pub fn new(platform: impl Into<String>, is_rollout: bool) -> Self {
        Self {
            platform: platform.into(),
            is_rollout,
        }
    }

    /// Platform: override -> experiment `app_name` -> [`DEFAULT_PLATFORM`].
    /// Rollout flag comes from the experiment only.
    pub fn derive(override_spec: Option<&MonitoringSpec>, experiment: Option<&Experiment>) -> Self {
        let platform = override_spec
            .and_then(|s| s.project.platform.clone())
            .or_else(|| experiment.and_then(|e| e.app_name.clone()))
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());
        Self {
            platform,
            is_rollout: experiment.map(|e| e.is_rollout).unwrap_or(false),
        }
    }
}
