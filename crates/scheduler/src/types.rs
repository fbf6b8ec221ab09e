use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vigil_spec::ResolvedConfiguration;

use crate::task::TaskReport;

/// Errors that abort a scheduling pass before any task runs.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Routine-mode worker pool width. 0 = available parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_parallelism() -> usize { 8 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
        }
    }
}

impl SchedulerConfig {
    pub fn new(parallelism: usize) -> Self {
        Self { parallelism }
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_parallelism(&self) -> usize {
        if self.parallelism == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.parallelism
        }
    }
}

/// Outcome of one routine pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub date: NaiveDate,
    /// One report per attempted project, in input order.
    pub reports: Vec<TaskReport>,
    /// Projects that were not eligible on `date`.
    pub ineligible: usize,
    /// Set when the metadata record could not be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
}

impl RunSummary {
    /// True when every attempted task succeeded and metadata was written.
    pub fn success(&self) -> bool {
        self.metadata_error.is_none() && self.reports.iter().all(TaskReport::succeeded)
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.succeeded()).count()
    }
}

/// Outcome of one backfill.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillSummary {
    pub slug: String,
    /// Clamped range actually processed; `None` when it was empty.
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// One report per date, ascending.
    pub reports: Vec<TaskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
}

impl BackfillSummary {
    pub fn success(&self) -> bool {
        self.metadata_error.is_none() && self.reports.iter().all(TaskReport::succeeded)
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.succeeded()).count()
    }
}

/// Intersect the requested range with the project's own window.
///
/// Returns `Ok(None)` when the intersection is empty.
pub fn effective_range(
    start: NaiveDate,
    end: NaiveDate,
    config: &ResolvedConfiguration,
) -> Result<Option<(NaiveDate, NaiveDate)>, SchedulerError> {
    if start > end {
        return Err(SchedulerError::InvalidRange { start, end });
    }

    let start = config.start_date().map_or(start, |s| s.max(start));
    let end = config.end_date().map_or(end, |e| e.min(end));
    Ok((start <= end).then_some((start, end)))
}

/// Every date in `[start, end]`, ascending.
pub(crate) fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.resolved_parallelism(), 8);
    }

    #[test]
    fn zero_parallelism_auto_detects() {
        assert!(SchedulerConfig::new(0).resolved_parallelism() > 0);
    }

    #[test]
    fn dates_are_inclusive_and_ascending() {
        let dates: Vec<_> = dates_between(date(2022, 2, 27), date(2022, 3, 2)).collect();
        assert_eq!(
            dates,
            vec![date(2022, 2, 27), date(2022, 2, 28), date(2022, 3, 1), date(2022, 3, 2)]
        );
        assert_eq!(dates_between(date(2022, 1, 2), date(2022, 1, 1)).count(), 0);
    }
}
