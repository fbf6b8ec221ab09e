use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error};

use crate::task::{Destination, ExecutionError, Executor, RunTask, TaskReport, TaskState};

/// Run one task to completion. Errors and panics become a failed report.
pub(super) fn execute_task(
    executor: &dyn Executor,
    destination: &Destination,
    task: &RunTask,
) -> TaskReport {
    debug!(slug = %task.slug, date = %task.date, state = %TaskState::Running, "task started");
    let started = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| executor.execute(destination, task)))
        .unwrap_or_else(|payload| Err(ExecutionError::Panicked(panic_message(payload.as_ref()))));
    let duration = started.elapsed();

    let (state, error) = match outcome {
        Ok(()) => (TaskState::Succeeded, None),
        Err(e) => {
            error!(slug = %task.slug, date = %task.date, error = %e, "task failed");
            (TaskState::Failed, Some(e.to_string()))
        }
    };
    debug!(slug = %task.slug, date = %task.date, %state, ?duration, "task finished");

    TaskReport {
        slug: task.slug.clone(),
        date: task.date,
        state,
        duration,
        error,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
