use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use vigil_core::Config;
use vigil_spec::schema::parse_date;

/// Resolve layered monitoring configs and schedule their runs.
///
/// Environment variables (optionally from `.env`) provide defaults for every
/// option; flags given here take precedence.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
pub struct CliArgs {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "VIGIL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every project eligible on one date.
    Run(RunArgs),
    /// Run one project over a date range, oldest date first.
    Backfill(BackfillArgs),
    /// Check config files without running anything.
    ValidateConfig(ValidateArgs),
}

// ── Shared option groups ────────────────────────────────────────────

/// Where configs and experiment metadata come from.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Public config directory. Repeatable; each must exist.
    #[arg(long = "config-dir")]
    pub config_dirs: Vec<PathBuf>,

    /// Private config directory. Repeatable; missing ones are skipped.
    #[arg(long = "private-config-dir")]
    pub private_config_dirs: Vec<PathBuf>,

    /// Experiment metadata snapshot (JSON).
    #[arg(long)]
    pub experiments: Option<PathBuf>,
}

impl SourceArgs {
    pub fn apply(&self, config: &mut Config) {
        if !self.config_dirs.is_empty() {
            config.sources.config_dirs = self.config_dirs.clone();
        }
        if !self.private_config_dirs.is_empty() {
            config.sources.private_config_dirs = self.private_config_dirs.clone();
        }
        if let Some(path) = &self.experiments {
            config.experiments.path = path.clone();
        }
    }
}

/// Where results and metadata go.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    #[arg(long)]
    pub project_id: Option<String>,

    #[arg(long)]
    pub dataset_id: Option<String>,

    /// Directory for the metadata record.
    #[arg(long)]
    pub metadata_dir: Option<PathBuf>,

    /// Command run once per task; omit for a dry run.
    #[arg(long)]
    pub executor_command: Option<String>,
}

impl OutputArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(project_id) = &self.project_id {
            config.output.project_id = project_id.clone();
        }
        if let Some(dataset_id) = &self.dataset_id {
            config.output.dataset_id = dataset_id.clone();
        }
        if let Some(dir) = &self.metadata_dir {
            config.metadata.dir = dir.clone();
        }
        if let Some(command) = &self.executor_command {
            config.executor.command = Some(command.clone());
        }
    }
}

// ── Subcommands ─────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Only run this project.
    #[arg(long)]
    pub slug: Option<String>,

    /// Worker pool width.
    #[arg(long)]
    pub parallelism: Option<usize>,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct BackfillArgs {
    #[arg(long, value_parser = parse_date)]
    pub start_date: NaiveDate,

    #[arg(long, value_parser = parse_date)]
    pub end_date: NaiveDate,

    #[arg(long)]
    pub slug: String,

    /// Local override used instead of the one in the config sources. Its
    /// file stem must equal the slug.
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Config files to check.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub sources: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run() {
        let args = CliArgs::try_parse_from([
            "vigil",
            "run",
            "--date",
            "2022-01-02",
            "--config-dir",
            "a",
            "--config-dir",
            "b",
            "--parallelism",
            "3",
        ])
        .unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.date, NaiveDate::from_ymd_opt(2022, 1, 2).unwrap());
        assert_eq!(run.sources.config_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(run.parallelism, Some(3));
    }

    #[test]
    fn backfill_requires_slug() {
        let err = CliArgs::try_parse_from([
            "vigil",
            "backfill",
            "--start-date",
            "2022-01-01",
            "--end-date",
            "2022-01-05",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(CliArgs::try_parse_from(["vigil", "run", "--date", "yesterday"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::for_profile("");
        let output = OutputArgs {
            project_id: Some("other".to_string()),
            ..Default::default()
        };
        output.apply(&mut config);
        assert_eq!(config.output.project_id, "other");

        let sources = SourceArgs {
            experiments: Some(PathBuf::from("snap.json")),
            ..Default::default()
        };
        sources.apply(&mut config);
        assert_eq!(config.experiments.path, PathBuf::from("snap.json"));
    }
}
