//! Concrete [`Executor`] implementations.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::task::{Destination, ExecutionError, Executor, RunTask};

/// Logs each task and succeeds without doing any work.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn execute(&self, destination: &Destination, task: &RunTask) -> Result<(), ExecutionError> {
        info!(
            slug = %task.slug,
            date = %task.date,
            project_id = %destination.project_id,
            dataset_id = %destination.dataset_id,
            metrics = task.config.metrics().len(),
            "dry run"
        );
        Ok(())
    }
}

/// Runs an external command once per task.
///
/// The task identity is passed as `VIGIL_SLUG`, `VIGIL_DATE`,
/// `VIGIL_PROJECT_ID` and `VIGIL_DATASET_ID`; the resolved configuration is
/// written to stdin as JSON. A non-zero exit status fails the task.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` when it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Executor for CommandExecutor {
    fn name(&self) -> &str {
        &self.program
    }

    fn execute(&self, destination: &Destination, task: &RunTask) -> Result<(), ExecutionError> {
        let payload = serde_json::to_vec(task.config.as_ref())?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("VIGIL_SLUG", &task.slug)
            .env("VIGIL_DATE", task.date.to_string())
            .env("VIGIL_PROJECT_ID", &destination.project_id)
            .env("VIGIL_DATASET_ID", &destination.dataset_id)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = write_payload(&mut stdin, &payload) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        }

        let status = child.wait()?;
        debug!(slug = %task.slug, date = %task.date, %status, "command finished");
        if status.success() {
            Ok(())
        } else {
            Err(ExecutionError::Failed(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Feed the task config to the command. Commands that never read stdin may
/// close it early, so a broken pipe is not an error.
fn write_payload(stdin: &mut impl Write, payload: &[u8]) -> std::io::Result<()> {
    match stdin.write_all(payload) {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, task};

    fn destination() -> Destination {
        Destination::new("proj", "ds")
    }

    #[test]
    fn dry_run_always_succeeds() {
        let task = task("p", "start_date = \"2022-01-01\"", date(2022, 1, 2));
        assert!(DryRunExecutor.execute(&destination(), &task).is_ok());
    }

    #[test]
    fn blank_command_line_is_rejected() {
        assert!(CommandExecutor::from_command_line("   ").is_none());
        let exec = CommandExecutor::from_command_line("runner --flag x").unwrap();
        assert_eq!(exec.name(), "runner");
        assert_eq!(exec.args, vec!["--flag", "x"]);
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_decides_outcome() {
        let task = task("p", "start_date = \"2022-01-01\"", date(2022, 1, 2));

        let ok = CommandExecutor::new("true", Vec::new());
        assert!(ok.execute(&destination(), &task).is_ok());

        let failing = CommandExecutor::new("false", Vec::new());
        assert!(matches!(
            failing.execute(&destination(), &task),
            Err(ExecutionError::Failed(_))
        ));
    }

    struct BrokenWriter(ErrorKind);

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(self.0, "stdin gone"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_stdin_is_not_a_write_failure() {
        assert!(write_payload(&mut BrokenWriter(ErrorKind::BrokenPipe), b"{}").is_ok());
    }

    #[test]
    fn other_stdin_errors_are_reported() {
        let err = write_payload(&mut BrokenWriter(ErrorKind::PermissionDenied), b"{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn missing_program_is_io_error() {
        let task = task("p", "start_date = \"2022-01-01\"", date(2022, 1, 2));
        let missing = CommandExecutor::new("vigil-no-such-program", Vec::new());
        assert!(matches!(
            missing.execute(&destination(), &task),
            Err(ExecutionError::Io(_))
        ));
    }
}
