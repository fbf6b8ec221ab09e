use std::sync::Arc;

use tracing::{error, info};
use vigil_spec::ResolvedProject;

use crate::metadata::{MetadataRecord, MetadataSink};
use crate::task::{Destination, Executor};
use crate::types::SchedulerConfig;

/// Dispatches [`RunTask`](crate::task::RunTask)s to an [`Executor`] and
/// records each pass through a [`MetadataSink`].
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) destination: Destination,
    pub(super) executor: Arc<dyn Executor>,
    /// Written only from the orchestrating thread, after workers finish.
    pub(super) metadata: Arc<dyn MetadataSink>,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        destination: Destination,
        executor: Arc<dyn Executor>,
        metadata: Arc<dyn MetadataSink>,
    ) -> Self {
        info!(
            executor = executor.name(),
            parallelism = config.resolved_parallelism(),
            project_id = %destination.project_id,
            dataset_id = %destination.dataset_id,
            "scheduler ready"
        );
        Self {
            config,
            destination,
            executor,
            metadata,
        }
    }

    /// Write the pass's record. Returns the error text on failure.
    pub(super) fn write_metadata(&self, projects: Vec<ResolvedProject>) -> Option<String> {
        let record = MetadataRecord::new(&self.destination, projects);
        match self.metadata.write(&record) {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "failed to write metadata record");
                Some(e.to_string())
            }
        }
    }
}
