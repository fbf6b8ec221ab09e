use chrono::NaiveDate;
use tracing::{info, warn};
use vigil_spec::ResolvedProject;

use crate::task::RunTask;
use crate::types::{dates_between, effective_range, BackfillSummary, SchedulerError};

use super::execution::execute_task;
use super::Scheduler;

impl Scheduler {
    /// Run one project over `[start, end]`, clamped to its own window.
    ///
    /// Dates run one at a time, oldest first, on the calling thread. A failed
    /// date is recorded and the remaining dates still run. One metadata record
    /// for this project is written at the end, even when the clamped range is
    /// empty.
    pub fn run_backfill(
        &self,
        project: &ResolvedProject,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BackfillSummary, SchedulerError> {
        let range = effective_range(start, end, &project.config)?;

        let mut reports = Vec::new();
        match range {
            Some((from, to)) => {
                info!(slug = %project.slug, %from, %to, "starting backfill");
                for date in dates_between(from, to) {
                    let task = RunTask {
                        slug: project.slug.clone(),
                        config: project.config.clone(),
                        date,
                    };
                    reports.push(execute_task(self.executor.as_ref(), &self.destination, &task));
                }
            }
            None => warn!(
                slug = %project.slug,
                %start,
                %end,
                "requested range does not overlap the project window, nothing to backfill"
            ),
        }

        let metadata_error = self.write_metadata(vec![project.clone()]);

        let summary = BackfillSummary {
            slug: project.slug.clone(),
            range,
            reports,
            metadata_error,
        };
        if summary.success() {
            info!(slug = %summary.slug, dates = summary.reports.len(), "backfill succeeded");
        } else {
            warn!(slug = %summary.slug, dates = summary.reports.len(), failed = summary.failed(), "backfill failed");
        }
        Ok(summary)
    }
}
