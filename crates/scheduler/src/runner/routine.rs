use std::sync::mpsc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use vigil_spec::eligibility::{self, Eligibility};
use vigil_spec::ResolvedProject;

use crate::task::{Executor, RunTask, TaskReport};
use crate::types::{RunSummary, SchedulerError};

use super::execution::execute_task;
use super::Scheduler;

impl Scheduler {
    /// Run every project eligible on `date` on a bounded worker pool.
    ///
    /// Tasks are independent; one failing or panicking never stops the
    /// others. Once all workers have finished, one metadata record covering
    /// every attempted project is written. Nothing is written when no
    /// project is eligible.
    pub fn run_routine(
        &self,
        date: NaiveDate,
        projects: &[ResolvedProject],
    ) -> Result<RunSummary, SchedulerError> {
        let eligible: Vec<&ResolvedProject> = projects
            .iter()
            .filter(|p| match eligibility::check(&p.config, date) {
                Eligibility::Eligible => true,
                reason => {
                    debug!(slug = %p.slug, %date, ?reason, "project not eligible");
                    false
                }
            })
            .collect();
        let ineligible = projects.len() - eligible.len();

        if eligible.is_empty() {
            info!(%date, ineligible, "no eligible projects");
            return Ok(RunSummary {
                date,
                reports: Vec::new(),
                ineligible,
                metadata_error: None,
            });
        }

        let num_workers = self.config.resolved_parallelism();
        info!(%date, eligible = eligible.len(), ineligible, workers = num_workers, "starting routine run");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .build()?;

        let executor: &dyn Executor = self.executor.as_ref();
        let destination = &self.destination;
        let (tx, rx) = mpsc::channel::<(usize, TaskReport)>();

        pool.scope(|s| {
            for (index, project) in eligible.iter().enumerate() {
                let tx = tx.clone();
                let task = RunTask {
                    slug: project.slug.clone(),
                    config: project.config.clone(),
                    date,
                };
                s.spawn(move |_| {
                    let report = execute_task(executor, destination, &task);
                    // Receiver lives until after the scope ends.
                    let _ = tx.send((index, report));
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, TaskReport)> = rx.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        let reports: Vec<TaskReport> = results.into_iter().map(|(_, report)| report).collect();

        let metadata_error = self.write_metadata(eligible.into_iter().cloned().collect());

        let summary = RunSummary {
            date,
            reports,
            ineligible,
            metadata_error,
        };
        if summary.success() {
            info!(%date, tasks = summary.reports.len(), "routine run succeeded");
        } else {
            warn!(%date, tasks = summary.reports.len(), failed = summary.failed(), "routine run failed");
        }
        Ok(summary)
    }
}
