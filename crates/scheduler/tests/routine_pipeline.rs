//! End to end: config directory -> registry -> catalog -> scheduler -> metadata file.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::TempDir;
use vigil_scheduler::{
    Destination, ExecutionError, Executor, JsonFileMetadataSink, RunTask, Scheduler,
    SchedulerConfig,
};
use vigil_spec::{ConfigSource, ExperimentCollection, ProjectCatalog, Registry};

struct CountingExecutor {
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, String)>>,
}

impl Executor for CountingExecutor {
    fn name(&self) -> &str {
        "counting"
    }

    fn execute(&self, _destination: &Destination, task: &RunTask) -> Result<(), ExecutionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let from = task
            .config
            .metrics()
            .first()
            .map(|m| m.data_source.from_expression.clone())
            .unwrap_or_default();
        self.seen.lock().unwrap().push((task.slug.clone(), from));
        Ok(())
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "definitions/firefox_desktop.toml",
        r#"
[metrics.crashes]
select_expression = "COUNT(*)"
data_source = "crash"

[data_sources.crash]
from_expression = "telemetry.crash_{slug}"
"#,
    );
    write(
        dir.path(),
        "defaults/firefox_desktop.toml",
        "[project]\nmetrics = [\"crashes\"]\n",
    );
    write(
        dir.path(),
        "early.toml",
        "[project]\nstart_date = 2022-01-01\n[project.population]\nmonitor_entire_population = true\n",
    );
    write(
        dir.path(),
        "late.toml",
        "[project]\nstart_date = \"2023-01-01\"\n[project.population]\nmonitor_entire_population = true\n",
    );
    write(dir.path(), "broken.toml", "[project\n");
    dir
}

#[test]
fn routine_pass_writes_metadata_for_eligible_projects() {
    let config = config_dir();
    let metadata_dir = TempDir::new().unwrap();

    let registry = Registry::load(&[ConfigSource::public(config.path())]).unwrap();
    let experiments = ExperimentCollection::default();
    let projects = ProjectCatalog::new(&registry, &experiments).collect(None);
    assert_eq!(projects.len(), 2);

    let executor = Arc::new(CountingExecutor {
        calls: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });
    let sink = JsonFileMetadataSink::new(metadata_dir.path());
    let scheduler = Scheduler::new(
        SchedulerConfig::new(4),
        Destination::new("proj", "ds"),
        executor.clone(),
        Arc::new(sink.clone()),
    );

    let summary = scheduler.run_routine(date(2022, 3, 1), &projects).unwrap();
    assert!(summary.success());
    assert_eq!(summary.ineligible, 1);
    assert_eq!(executor.calls.load(Ordering::Relaxed), 1);
    assert_eq!(
        executor.seen.lock().unwrap().clone(),
        vec![("early".to_string(), "telemetry.crash_early".to_string())]
    );

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sink.path_for("proj", "ds")).unwrap()).unwrap();
    let slugs: Vec<&str> = record["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["early"]);
}

#[test]
fn backfill_through_catalog() {
    let config = config_dir();
    let metadata_dir = TempDir::new().unwrap();

    let registry = Registry::load(&[ConfigSource::public(config.path())]).unwrap();
    let experiments = ExperimentCollection::default();
    let project = ProjectCatalog::new(&registry, &experiments).find("late").unwrap();

    let executor = Arc::new(CountingExecutor {
        calls: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });
    let scheduler = Scheduler::new(
        SchedulerConfig::default(),
        Destination::new("proj", "ds"),
        executor.clone(),
        Arc::new(JsonFileMetadataSink::new(metadata_dir.path())),
    );

    let summary = scheduler
        .run_backfill(&project, date(2022, 12, 30), date(2023, 1, 3))
        .unwrap();
    assert!(summary.success());
    assert_eq!(summary.range, Some((date(2023, 1, 1), date(2023, 1, 3))));
    assert_eq!(executor.calls.load(Ordering::Relaxed), 3);
}
