use anyhow::Result;
use tracing::{error, info, warn};
use vigil_core::Config;
use vigil_spec::validate_paths;

use crate::cli::ValidateArgs;

use super::{load_experiments, load_registry};

pub fn execute(args: ValidateArgs, mut config: Config) -> Result<bool> {
    args.sources.apply(&mut config);

    let registry = load_registry(&config)?;
    let experiments = load_experiments(&config)?;

    let validations = validate_paths(&args.paths, &registry, &experiments);
    let mut dirty = 0;
    for validation in &validations {
        let path = validation.path.display();
        let result = &validation.result;
        for warning in &result.warnings {
            warn!(%path, field = %warning.path, "{}", warning.message);
        }
        for err in &result.errors {
            match &err.suggestion {
                Some(suggestion) => error!(%path, field = %err.path, %suggestion, "{}", err.message),
                None => error!(%path, field = %err.path, "{}", err.message),
            }
        }
        if result.valid {
            info!(%path, "config is valid");
        } else {
            dirty += 1;
        }
        if result.fatal {
            error!(%path, "stopping validation");
        }
    }

    info!(checked = validations.len(), dirty, "validation finished");
    Ok(dirty == 0)
}
