//! Scheduler runner -- worker pool dispatch and sequential backfills.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, accessors and metadata writing
//! - `execution`: running one task with panic containment
//! - `routine`: one date, all eligible projects, concurrently
//! - `backfill`: one project, a date range, in ascending order

mod backfill;
mod core;
mod execution;
mod routine;
#[cfg(test)]
mod tests;

pub use self::core::Scheduler;
