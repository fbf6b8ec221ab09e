use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated list, dropping empty items.
fn profiled_env_list(profile: &str, key: &str, default: &str) -> Vec<String> {
    profiled_env_or(profile, key, default)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub output: OutputConfig,
    pub sources: SourcesConfig,
    pub experiments: ExperimentsConfig,
    pub scheduler: SchedulerSettings,
    pub metadata: MetadataConfig,
    pub executor: ExecutorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VIGIL_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("VIGIL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            output: OutputConfig::from_env_profiled(p),
            sources: SourcesConfig::from_env_profiled(p),
            experiments: ExperimentsConfig::from_env_profiled(p),
            scheduler: SchedulerSettings::from_env_profiled(p),
            metadata: MetadataConfig::from_env_profiled(p),
            executor: ExecutorConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scheduler.parallelism == 0 {
            return Err(CoreError::InvalidValue {
                key: "VIGIL_PARALLELISM".to_string(),
                value: "0".to_string(),
            });
        }
        if self.sources.config_dirs.is_empty() {
            return Err(CoreError::InvalidValue {
                key: "VIGIL_CONFIG_DIRS".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  output:      project={}, dataset={}", self.output.project_id, self.output.dataset_id);
        tracing::info!(
            "  sources:     public={:?}, private={:?}",
            self.sources.config_dirs,
            self.sources.private_config_dirs
        );
        tracing::info!("  experiments: file={}", self.experiments.path.display());
        tracing::info!("  scheduler:   parallelism={}", self.scheduler.parallelism);
        tracing::info!("  metadata:    dir={}", self.metadata.dir.display());
        tracing::info!(
            "  executor:    command={}",
            self.executor.command.as_deref().unwrap_or("(dry run)")
        );
    }
}

// ── Output ────────────────────────────────────────────────────

/// Destination the executor writes results to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub project_id: String,
    pub dataset_id: String,
}

impl OutputConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            project_id: profiled_env_or(p, "VIGIL_PROJECT_ID", "monitoring-prod"),
            dataset_id: profiled_env_or(p, "VIGIL_DATASET_ID", "operational_monitoring"),
        }
    }
}

// ── Config sources ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Public sources. Each must exist.
    pub config_dirs: Vec<PathBuf>,
    /// Private sources. Missing ones are skipped.
    pub private_config_dirs: Vec<PathBuf>,
}

impl SourcesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            config_dirs: profiled_env_list(p, "VIGIL_CONFIG_DIRS", "config")
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            private_config_dirs: profiled_env_list(p, "VIGIL_PRIVATE_CONFIG_DIRS", "")
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

// ── Experiments ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentsConfig {
    /// JSON snapshot of experiment metadata.
    pub path: PathBuf,
}

impl ExperimentsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: PathBuf::from(profiled_env_or(p, "VIGIL_EXPERIMENTS_FILE", "experiments.json")),
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Worker pool width for routine runs.
    pub parallelism: usize,
}

impl SchedulerSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            parallelism: profiled_env_usize(p, "VIGIL_PARALLELISM", 8),
        }
    }
}

// ── Metadata ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub dir: PathBuf,
}

impl MetadataConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dir: PathBuf::from(profiled_env_or(p, "VIGIL_METADATA_DIR", "data/metadata")),
        }
    }
}

// ── Executor ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Command line run once per task. `None` selects the dry-run executor.
    pub command: Option<String>,
}

impl ExecutorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            command: profiled_env_opt(p, "VIGIL_EXECUTOR_COMMAND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_label_defaults() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn profile_is_uppercased() {
        let config = Config::for_profile("staging");
        assert_eq!(config.profile, "STAGING");
        assert_eq!(config.profile_label(), "STAGING");
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let mut config = Config::for_profile("");
        config.scheduler.parallelism = 0;
        config.sources.config_dirs = vec![PathBuf::from("config")];
        assert!(matches!(config.validate(), Err(CoreError::InvalidValue { .. })));
    }
}
