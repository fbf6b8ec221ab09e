//! Fixtures shared by unit tests.

use std::sync::Arc;

use chrono::NaiveDate;
use vigil_spec::{
    Classification, FragmentKind, MonitoringSpec, Registry, ResolvedConfiguration, ResolvedProject,
    Resolver, SpecFragment,
};

use crate::task::RunTask;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Resolve a project whose `[project]` table is `project`.
pub(crate) fn resolved(slug: &str, project: &str) -> ResolvedConfiguration {
    let registry = Registry::from_fragments([SpecFragment::parse(
        "firefox_desktop",
        FragmentKind::Definition,
        "[data_sources.main]\nfrom_expression = \"telemetry.main\"\n",
    )
    .unwrap()])
    .unwrap();
    let spec = MonitoringSpec::from_toml_str(&format!("[project]\n{project}\n")).unwrap();
    Resolver::new(&registry)
        .resolve_with_override(
            slug,
            &Classification::new("firefox_desktop", false),
            Some(&spec),
            None,
        )
        .unwrap()
}

pub(crate) fn project(slug: &str, project: &str) -> ResolvedProject {
    ResolvedProject::new(slug, resolved(slug, project))
}

pub(crate) fn task(slug: &str, project: &str, date: NaiveDate) -> RunTask {
    RunTask {
        slug: slug.to_string(),
        config: Arc::new(resolved(slug, project)),
        date,
    }
}
