use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use vigil_core::Config;
use vigil_spec::{MonitoringSpec, ProjectCatalog};

use crate::cli::BackfillArgs;

use super::{build_scheduler, load_experiments, load_registry};

pub fn execute(args: BackfillArgs, mut config: Config) -> Result<bool> {
    args.sources.apply(&mut config);
    args.output.apply(&mut config);
    config.validate()?;
    config.log_summary();

    let local_override = args
        .config_file
        .as_deref()
        .map(|path| read_override(path, &args.slug))
        .transpose()?;

    let registry = load_registry(&config)?;
    let experiments = load_experiments(&config)?;
    let catalog = ProjectCatalog::new(&registry, &experiments);
    let project = match &local_override {
        Some(spec) => catalog.resolve_one(&args.slug, Some(spec)),
        None => catalog.find(&args.slug),
    }
    .with_context(|| format!("cannot backfill '{}'", args.slug))?;

    let summary = build_scheduler(&config).run_backfill(&project, args.start_date, args.end_date)?;
    Ok(summary.success())
}

/// Read a local override; its file stem must name the project.
fn read_override(path: &Path, slug: &str) -> Result<MonitoringSpec> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if stem != slug {
        bail!(
            "config file {} does not match slug '{}'",
            path.display(),
            slug
        );
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    MonitoringSpec::from_toml_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))
}
