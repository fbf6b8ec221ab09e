mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};

fn main() -> ExitCode {
    // Before parsing so `.env` values reach clap's env fallbacks.
    vigil_core::config::load_dotenv();
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    let config = vigil_core::Config::from_env();

    let outcome = match args.command {
        Command::Run(run) => commands::run::execute(run, config),
        Command::Backfill(backfill) => commands::backfill::execute(backfill, config),
        Command::ValidateConfig(validate) => commands::validate::execute(validate, config),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
