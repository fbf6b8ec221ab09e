use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use vigil_spec::ResolvedProject;

use crate::metadata::{MetadataError, MetadataRecord, MetadataSink};
use crate::runner::Scheduler;
use crate::task::{Destination, ExecutionError, Executor, RunTask, TaskState};
use crate::testing::{date, project};
use crate::types::{effective_range, SchedulerConfig, SchedulerError};

/// Mock executor: fails or panics for chosen (slug, date) pairs.
#[derive(Default)]
struct MockExecutor {
    fail: HashSet<(String, NaiveDate)>,
    panic: HashSet<(String, NaiveDate)>,
    execute_count: AtomicUsize,
    attempts: Mutex<Vec<(String, NaiveDate)>>,
}

impl MockExecutor {
    fn failing(mut self, slug: &str, date: NaiveDate) -> Self {
        self.fail.insert((slug.to_string(), date));
        self
    }

    fn panicking(mut self, slug: &str, date: NaiveDate) -> Self {
        self.panic.insert((slug.to_string(), date));
        self
    }

    fn execution_count(&self) -> usize {
        self.execute_count.load(Ordering::Relaxed)
    }

    fn attempted_dates(&self) -> Vec<NaiveDate> {
        self.attempts.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }
}

impl Executor for MockExecutor {
    fn name(&self) -> &str {
        "mock"
    }

    fn execute(&self, _destination: &Destination, task: &RunTask) -> Result<(), ExecutionError> {
        self.execute_count.fetch_add(1, Ordering::Relaxed);
        let key = (task.slug.clone(), task.date);
        self.attempts.lock().unwrap().push(key.clone());
        if self.panic.contains(&key) {
            panic!("executor blew up on {}", task.slug);
        }
        if self.fail.contains(&key) {
            return Err(ExecutionError::Failed(format!("forced failure for {}", task.slug)));
        }
        Ok(())
    }
}

/// Sink that keeps every record it receives.
#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<MetadataRecord>>,
    broken: bool,
}

impl RecordingSink {
    fn broken() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    fn records(&self) -> Vec<MetadataRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl MetadataSink for RecordingSink {
    fn write(&self, record: &MetadataRecord) -> Result<(), MetadataError> {
        if self.broken {
            return Err(MetadataError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn scheduler(executor: &Arc<MockExecutor>, sink: &Arc<RecordingSink>) -> Scheduler {
    Scheduler::new(
        SchedulerConfig::new(2),
        Destination::new("proj", "ds"),
        executor.clone(),
        sink.clone(),
    )
}

const WINDOW: &str = "start_date = \"2022-01-01\"\nend_date = \"2022-02-01\"";

fn three_projects() -> Vec<ResolvedProject> {
    vec![project("a", WINDOW), project("b", WINDOW), project("c", WINDOW)]
}

// ── Routine mode ────────────────────────────────────────────────────

#[test]
fn routine_failure_still_records_every_attempt() {
    let run_date = date(2022, 1, 10);
    let executor = Arc::new(MockExecutor::default().failing("b", run_date));
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_routine(run_date, &three_projects())
        .unwrap();

    assert!(!summary.success());
    assert_eq!(summary.failed(), 1);
    assert_eq!(executor.execution_count(), 3);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let slugs: Vec<&str> = records[0].slugs().collect();
    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(records[0].project_id, "proj");
    assert_eq!(records[0].dataset_id, "ds");
}

#[test]
fn routine_panic_counts_as_failure() {
    let run_date = date(2022, 1, 10);
    let executor = Arc::new(MockExecutor::default().panicking("a", run_date));
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_routine(run_date, &three_projects())
        .unwrap();

    assert!(!summary.success());
    let report = summary.reports.iter().find(|r| r.slug == "a").unwrap();
    assert_eq!(report.state, TaskState::Failed);
    assert!(report.error.as_deref().unwrap().contains("blew up"));
    // Siblings ran to completion.
    assert_eq!(summary.reports.iter().filter(|r| r.succeeded()).count(), 2);
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn routine_reports_follow_input_order() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_routine(date(2022, 1, 10), &three_projects())
        .unwrap();

    assert!(summary.success());
    let slugs: Vec<&str> = summary.reports.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, vec!["a", "b", "c"]);
}

#[test]
fn routine_only_runs_eligible_projects() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());
    let projects = vec![
        project("running", WINDOW),
        project("skipped", &format!("{WINDOW}\nskip = true")),
        project("later", "start_date = \"2022-06-01\""),
        project("undated", ""),
    ];

    let summary = scheduler(&executor, &sink)
        .run_routine(date(2022, 1, 10), &projects)
        .unwrap();

    assert!(summary.success());
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.ineligible, 3);
    assert_eq!(sink.records()[0].slugs().collect::<Vec<_>>(), vec!["running"]);
}

#[test]
fn routine_with_nothing_eligible_writes_no_metadata() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_routine(date(2021, 6, 1), &three_projects())
        .unwrap();

    assert!(summary.success());
    assert!(summary.reports.is_empty());
    assert_eq!(executor.execution_count(), 0);
    assert!(sink.records().is_empty());
}

#[test]
fn metadata_failure_fails_the_pass() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::broken());

    let summary = scheduler(&executor, &sink)
        .run_routine(date(2022, 1, 10), &three_projects())
        .unwrap();

    assert!(summary.reports.iter().all(|r| r.succeeded()));
    assert!(summary.metadata_error.is_some());
    assert!(!summary.success());
}

/// Executor that records how many tasks ran at the same time.
#[derive(Default)]
struct ConcurrencyTracker {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    executed: AtomicUsize,
}

impl Executor for ConcurrencyTracker {
    fn name(&self) -> &str {
        "tracker"
    }

    fn execute(&self, _destination: &Destination, _task: &RunTask) -> Result<(), ExecutionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.executed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn routine_never_exceeds_configured_parallelism() {
    let tracker = Arc::new(ConcurrencyTracker::default());
    let sink = Arc::new(RecordingSink::default());
    let projects: Vec<ResolvedProject> = (0..8)
        .map(|i| project(&format!("p{i}"), WINDOW))
        .collect();

    let summary = Scheduler::new(
        SchedulerConfig::new(2),
        Destination::new("proj", "ds"),
        tracker.clone(),
        sink.clone(),
    )
    .run_routine(date(2022, 1, 10), &projects)
    .unwrap();

    assert!(summary.success());
    assert_eq!(summary.reports.len(), 8);
    assert_eq!(tracker.executed.load(Ordering::SeqCst), 8);
    let peak = tracker.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency was {peak}");
    assert_eq!(tracker.in_flight.load(Ordering::SeqCst), 0);
}

// ── Backfill mode ───────────────────────────────────────────────────

#[test]
fn backfill_range_is_clamped_to_project_window() {
    let config = project("p", WINDOW).config;
    let range = effective_range(date(2021, 12, 1), date(2022, 3, 1), &config).unwrap();
    assert_eq!(range, Some((date(2022, 1, 1), date(2022, 2, 1))));

    let open = project("open", "start_date = \"2022-01-01\"").config;
    let range = effective_range(date(2021, 12, 1), date(2022, 3, 1), &open).unwrap();
    assert_eq!(range, Some((date(2022, 1, 1), date(2022, 3, 1))));
}

#[test]
fn backfill_clamped_run_covers_window_exactly() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_backfill(&project("p", WINDOW), date(2021, 12, 1), date(2022, 3, 1))
        .unwrap();

    assert!(summary.success());
    assert_eq!(summary.range, Some((date(2022, 1, 1), date(2022, 2, 1))));
    assert_eq!(summary.reports.len(), 32);
    let attempted = executor.attempted_dates();
    assert_eq!(attempted.first(), Some(&date(2022, 1, 1)));
    assert_eq!(attempted.last(), Some(&date(2022, 2, 1)));
}

#[test]
fn backfill_continues_after_failed_day_in_order() {
    let executor = Arc::new(MockExecutor::default().failing("p", date(2022, 1, 2)));
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_backfill(&project("p", WINDOW), date(2022, 1, 1), date(2022, 1, 5))
        .unwrap();

    assert!(!summary.success());
    assert_eq!(summary.failed(), 1);
    assert_eq!(
        executor.attempted_dates(),
        vec![
            date(2022, 1, 1),
            date(2022, 1, 2),
            date(2022, 1, 3),
            date(2022, 1, 4),
            date(2022, 1, 5),
        ]
    );
    assert_eq!(summary.reports[1].state, TaskState::Failed);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].slugs().collect::<Vec<_>>(), vec!["p"]);
}

#[test]
fn backfill_outside_window_attempts_nothing() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());

    let summary = scheduler(&executor, &sink)
        .run_backfill(&project("p", WINDOW), date(2023, 1, 1), date(2023, 1, 5))
        .unwrap();

    assert!(summary.success());
    assert_eq!(summary.range, None);
    assert_eq!(executor.execution_count(), 0);
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn backfill_rejects_inverted_range() {
    let executor = Arc::new(MockExecutor::default());
    let sink = Arc::new(RecordingSink::default());

    let err = scheduler(&executor, &sink)
        .run_backfill(&project("p", WINDOW), date(2022, 1, 5), date(2022, 1, 1))
        .unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidRange { .. }));
    assert!(sink.records().is_empty());
}
