use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vigil_spec::ResolvedConfiguration;

/// Where executors write their output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub project_id: String,
    pub dataset_id: String,
}

impl Destination {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
        }
    }
}

/// One project on one date. Created per scheduling pass and then dropped.
#[derive(Debug, Clone)]
pub struct RunTask {
    pub slug: String,
    pub config: Arc<ResolvedConfiguration>,
    pub date: NaiveDate,
}

/// Error type for task execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Task failed: {0}")]
    Failed(String),
    #[error("Task panicked: {0}")]
    Panicked(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Runs one resolved configuration for one date.
///
/// Called concurrently from worker threads in routine mode.
pub trait Executor: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn execute(&self, destination: &Destination, task: &RunTask) -> Result<(), ExecutionError>;
}

/// Lifecycle of a task within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Final outcome of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub slug: String,
    pub date: NaiveDate,
    pub state: TaskState,
    /// How long the executor ran.
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    pub fn succeeded(&self) -> bool {
        self.state == TaskState::Succeeded
    }
}
