//! Config linting: merge and resolve one fragment without executing anything.
//!
//! Each fragment kind is checked the way it is used:
//! - definitions: internal references (metric and dimension data sources)
//! - platform and rollout defaults: resolved as if they were a project
//!   starting on a fixed dummy date
//! - overrides: classified against experiment metadata, then resolved
//!
//! Returns a [`ValidationResult`] with errors (file is dirty) and warnings
//! (advisory). An override without a matching experiment is `fatal` and stops
//! a multi-file validation.

mod fuzzy;


use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::experiment::{Experiment, ExperimentLookup};
use crate::registry::{classify_path, is_example_file, load_fragment, Registry};
use crate::resolver::{Classification, ResolveError, Resolver, DEFAULT_PLATFORM};
use crate::schema::{FragmentKind, MonitoringSpec, Privacy, SpecFragment};

// ── Result types ────────────────────────────────────────────────────

/// Outcome of validating one fragment.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Set when validation of further files should stop.
    pub fatal: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A validation error; any one makes the file dirty.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"metrics.uri_count.data_source"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            fatal: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push_error(path.into(), message.into(), None);
    }

    /// Record an unknown reference, suggesting the closest known name.
    pub(crate) fn unknown_reference<'a>(
        &mut self,
        path: impl Into<String>,
        what: &str,
        name: &str,
        known: impl IntoIterator<Item = &'a str>,
    ) {
        let suggestion = fuzzy::closest(name, known).map(|s| format!("did you mean '{s}'?"));
        self.push_error(path.into(), format!("undefined {what} '{name}'"), suggestion);
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    fn push_error(&mut self, path: String, message: String, suggestion: Option<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path,
            message,
            suggestion,
        });
    }

    fn resolve_error(&mut self, error: &ResolveError) {
        if matches!(error, ResolveError::UnknownExperiment { .. }) {
            self.fatal = true;
        }
        self.error("", error.to_string());
    }
}

/// Validation outcome for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    pub path: PathBuf,
    pub result: ValidationResult,
}

/// Start date given to defaults so they resolve like a real project.
pub fn dummy_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default()
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate an already-parsed fragment against `registry`.
pub fn validate_fragment(
    fragment: &SpecFragment,
    registry: &Registry,
    experiments: &dyn ExperimentLookup,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    match fragment.kind() {
        FragmentKind::Definition => check_definition(fragment.spec(), &mut result),
        FragmentKind::PlatformDefault | FragmentKind::RolloutDefault => {
            check_defaults(fragment, registry, &mut result)
        }
        FragmentKind::Override => check_override(fragment, registry, experiments, &mut result),
    }
    result
}

/// Read, classify and validate one file.
pub fn validate_path(
    path: &Path,
    registry: &Registry,
    experiments: &dyn ExperimentLookup,
) -> ValidationResult {
    match load_fragment(path, source_root(path), Privacy::Public) {
        Ok(fragment) => validate_fragment(&fragment, registry, experiments),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", e.to_string());
            result
        }
    }
}

/// Validate several files in order.
///
/// Definition files among `paths` are registered first (replacing the
/// registry's copy) so the other files are checked against the definitions
/// under review. Example files are skipped. Stops after the first fatal
/// result.
pub fn validate_paths(
    paths: &[PathBuf],
    registry: &Registry,
    experiments: &dyn ExperimentLookup,
) -> Vec<FileValidation> {
    let paths: Vec<&PathBuf> = paths
        .iter()
        .filter(|p| {
            let example = is_example_file(p);
            if example {
                info!(path = %p.display(), "skipping example config");
            }
            !example
        })
        .collect();

    let mut registry = registry.clone();
    for path in &paths {
        if !matches!(classify_path(path), Some((FragmentKind::Definition, _))) {
            continue;
        }
        // Parse failures are reported when the file itself is validated.
        if let Ok(fragment) = load_fragment(path, source_root(path), Privacy::Public) {
            debug!(path = %path.display(), platform = %fragment.slug(), "registering definition under review");
            registry = registry.replacing(fragment);
        }
    }

    let mut validations = Vec::with_capacity(paths.len());
    for path in paths {
        let result = validate_path(path, &registry, experiments);
        let fatal = result.fatal;
        validations.push(FileValidation {
            path: path.clone(),
            result,
        });
        if fatal {
            break;
        }
    }
    validations
}

/// Merge `spec` as the override of an explicitly classified project and
/// report merge and reference errors. Nothing is expanded or executed.
pub fn validate_merge(
    slug: &str,
    classification: &Classification,
    spec: &MonitoringSpec,
    registry: &Registry,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    merge_into(slug, classification, spec, registry, &mut result);
    result
}

// ── Checks ──────────────────────────────────────────────────────────

fn source_root(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Definitions must be internally consistent on their own.
fn check_definition(spec: &MonitoringSpec, result: &mut ValidationResult) {
    let sources = || spec.data_sources.keys().map(String::as_str);

    for (name, metric) in &spec.metrics {
        if !spec.data_sources.contains_key(&metric.data_source) {
            result.unknown_reference(
                format!("metrics.{name}.data_source"),
                "data source",
                &metric.data_source,
                sources(),
            );
        }
    }
    for (name, dimension) in &spec.dimensions {
        if !spec.data_sources.contains_key(&dimension.data_source) {
            result.unknown_reference(
                format!("dimensions.{name}.data_source"),
                "data source",
                &dimension.data_source,
                sources(),
            );
        }
    }

    for name in spec.data_sources.keys() {
        let used = spec.metrics.values().any(|m| &m.data_source == name)
            || spec.dimensions.values().any(|d| &d.data_source == name);
        if !used {
            result.warn(
                format!("data_sources.{name}"),
                "not referenced by any metric or dimension",
            );
        }
    }
}

/// Defaults resolve like a project that starts on [`dummy_start_date`].
fn check_defaults(fragment: &SpecFragment, registry: &Registry, result: &mut ValidationResult) {
    let mut spec = fragment.spec().clone();
    spec.project.start_date.get_or_insert_with(dummy_start_date);

    let classification = match fragment.kind() {
        FragmentKind::RolloutDefault => Classification::new(DEFAULT_PLATFORM, true),
        _ => Classification::new(fragment.slug(), false),
    };
    check_resolution(fragment.slug(), &classification, &spec, None, registry, result);
}

fn check_override(
    fragment: &SpecFragment,
    registry: &Registry,
    experiments: &dyn ExperimentLookup,
    result: &mut ValidationResult,
) {
    let slug = fragment.slug();
    let spec = fragment.spec();
    let experiment = experiments.with_slug(slug);

    if experiment.is_none() && !spec.project.monitors_entire_population() {
        result.resolve_error(&ResolveError::UnknownExperiment {
            slug: slug.to_string(),
        });
        return;
    }

    let classification = Classification::derive(Some(spec), experiment);
    check_resolution(slug, &classification, spec, experiment, registry, result);

    let has_start = spec.project.start_date.is_some()
        || experiment.and_then(|e| e.start_date).is_some();
    if result.valid && !has_start {
        result.warn(
            "project.start_date",
            "no start date here or on the experiment; the project never runs",
        );
    }
}

/// Merge, check references with suggestions, then run the full resolution.
fn check_resolution(
    slug: &str,
    classification: &Classification,
    spec: &MonitoringSpec,
    experiment: Option<&Experiment>,
    registry: &Registry,
    result: &mut ValidationResult,
) {
    merge_into(slug, classification, spec, registry, result);
    if !result.valid {
        return;
    }

    let resolver = Resolver::new(registry);
    if let Err(e) = resolver.resolve_with_override(slug, classification, Some(spec), experiment) {
        result.resolve_error(&e);
    }
}

fn merge_into(
    slug: &str,
    classification: &Classification,
    spec: &MonitoringSpec,
    registry: &Registry,
    result: &mut ValidationResult,
) {
    match Resolver::new(registry).merge_layers(slug, classification, Some(spec)) {
        Ok(merged) => check_references(&merged, result),
        Err(e) => result.resolve_error(&e),
    }
}

/// Names selected by the merged project must exist in the merged spec.
fn check_references(merged: &MonitoringSpec, result: &mut ValidationResult) {
    let metrics = || merged.metrics.keys().map(String::as_str);
    let dimensions = || merged.dimensions.keys().map(String::as_str);
    let sources = || merged.data_sources.keys().map(String::as_str);

    for name in merged.project.metrics.iter().flatten() {
        match merged.metrics.get(name) {
            None => result.unknown_reference("project.metrics", "metric", name, metrics()),
            Some(metric) if !merged.data_sources.contains_key(&metric.data_source) => result
                .unknown_reference(
                    format!("metrics.{name}.data_source"),
                    "data source",
                    &metric.data_source,
                    sources(),
                ),
            Some(_) => {}
        }
    }

    let population = &merged.project.population;
    if let Some(name) = &population.data_source {
        if !merged.data_sources.contains_key(name) {
            result.unknown_reference("project.population.data_source", "data source", name, sources());
        }
    }
    for name in population.dimensions.iter().flatten() {
        if !merged.dimensions.contains_key(name) {
            result.unknown_reference("project.population.dimensions", "dimension", name, dimensions());
        }
    }
    if let Some(name) = &population.group_by_dimension {
        if !merged.dimensions.contains_key(name) {
            result.unknown_reference(
                "project.population.group_by_dimension",
                "dimension",
                name,
                dimensions(),
            );
        }
    }
}
