//! Subcommand implementations. Each returns `Ok(success)`; `Err` is reserved
//! for failures that abort before any project is attempted.

pub mod backfill;
pub mod run;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use vigil_core::Config;
use vigil_scheduler::{
    CommandExecutor, Destination, DryRunExecutor, Executor, JsonFileMetadataSink, Scheduler,
    SchedulerConfig,
};
use vigil_spec::registry::LoadStatus;
use vigil_spec::{ConfigSource, ExperimentCollection, Registry};

/// Load every configured source, public ones first.
pub(crate) fn load_registry(config: &Config) -> Result<Registry> {
    let sources: Vec<ConfigSource> = config
        .sources
        .config_dirs
        .iter()
        .map(ConfigSource::public)
        .chain(config.sources.private_config_dirs.iter().map(ConfigSource::private))
        .collect();

    let registry = Registry::load(&sources).context("failed to load config sources")?;

    let failed = registry
        .load_results()
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    if failed > 0 {
        warn!(failed, "some config files could not be loaded");
    }
    let platforms: Vec<&str> = registry.platforms().collect();
    info!(fragments = registry.len(), ?platforms, "registry ready");
    Ok(registry)
}

/// Experiments that were ever launched. A missing snapshot is empty.
pub(crate) fn load_experiments(config: &Config) -> Result<ExperimentCollection> {
    let experiments = ExperimentCollection::load_or_empty(&config.experiments.path)
        .with_context(|| {
            format!(
                "failed to read experiment snapshot {}",
                config.experiments.path.display()
            )
        })?;
    Ok(experiments.ever_launched())
}

pub(crate) fn build_scheduler(config: &Config) -> Scheduler {
    let executor: Arc<dyn Executor> = match config
        .executor
        .command
        .as_deref()
        .and_then(CommandExecutor::from_command_line)
    {
        Some(command) => Arc::new(command),
        None => Arc::new(DryRunExecutor),
    };

    Scheduler::new(
        SchedulerConfig::new(config.scheduler.parallelism),
        Destination::new(&config.output.project_id, &config.output.dataset_id),
        executor,
        Arc::new(JsonFileMetadataSink::new(&config.metadata.dir)),
    )
}
