use anyhow::Result;
use tracing::warn;
use vigil_core::Config;
use vigil_spec::ProjectCatalog;

use crate::cli::RunArgs;

use super::{build_scheduler, load_experiments, load_registry};

pub fn execute(args: RunArgs, mut config: Config) -> Result<bool> {
    args.sources.apply(&mut config);
    args.output.apply(&mut config);
    if let Some(parallelism) = args.parallelism {
        config.scheduler.parallelism = parallelism;
    }
    config.validate()?;
    config.log_summary();

    let registry = load_registry(&config)?;
    let experiments = load_experiments(&config)?;
    let projects = ProjectCatalog::new(&registry, &experiments).collect(args.slug.as_deref());
    if let (Some(slug), true) = (&args.slug, projects.is_empty()) {
        warn!(slug = %slug, "no resolvable project matches slug");
    }

    let summary = build_scheduler(&config).run_routine(args.date, &projects)?;
    Ok(summary.success())
}
