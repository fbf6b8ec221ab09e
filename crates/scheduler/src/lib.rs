//! Run scheduler for resolved monitoring projects.
//!
//! Two modes share one [`Scheduler`]:
//! - routine: every eligible project for one date, dispatched concurrently
//!   on a bounded worker pool
//! - backfill: one project over a date range, strictly in ascending order
//!
//! Each task's outcome is an explicit [`TaskReport`]; a failing or panicking
//! task never aborts its siblings. A single [`MetadataRecord`] is written per
//! scheduling pass.

pub mod executor;
pub mod metadata;
pub mod runner;
pub mod task;
pub mod types;

pub use executor::{CommandExecutor, DryRunExecutor};
pub use metadata::{JsonFileMetadataSink, MetadataError, MetadataRecord, MetadataSink};
pub use runner::Scheduler;
pub use task::{Destination, ExecutionError, Executor, RunTask, TaskReport, TaskState};
pub use types::{effective_range, BackfillSummary, RunSummary, SchedulerConfig, SchedulerError};

#[cfg(test)]
pub(crate) mod testing;
