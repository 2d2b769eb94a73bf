//! Subprocess execution with combined output capture.

use crate::BuildLog;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Subprocess execution errors.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` exited with status {code:?}")]
    ExitStatus {
        command: String,
        code: Option<i32>,
    },
}

/// Run a fixed argv command, streaming combined stdout/stderr into the log.
///
/// The command line is written to the log before execution. A non-zero exit
/// status is an error.
pub async fn run_argv(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    log: &mut BuildLog,
) -> Result<(), ExecError> {
    let line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    log.command_line(&line)?;

    let (stdout, stderr) = log.stdio()?;
    let mut command = Command::new(program);
    command.args(args).stdout(stdout).stderr(stderr);
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    debug!(command = %line, "Running command");
    let status = command.status().await?;
    if !status.success() {
        return Err(ExecError::ExitStatus {
            command: line,
            code: status.code(),
        });
    }
    Ok(())
}

/// Run a free-form shell command, streaming combined stdout/stderr into the
/// log.
///
/// The command is deliberately arbitrary text handed to `sh -c`:
/// repositories configure their own build tooling. The command line is
/// written to the log before execution; a non-zero exit status is an error
/// value, not a panic.
pub async fn run_shell(
    command_text: &str,
    cwd: &Path,
    log: &mut BuildLog,
) -> Result<(), ExecError> {
    log.command_line(command_text)?;

    let (stdout, stderr) = log.stdio()?;
    debug!(command = %command_text, "Running shell command");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command_text)
        .current_dir(cwd)
        .stdout(stdout)
        .stderr(stderr)
        .status()
        .await?;

    if !status.success() {
        return Err(ExecError::ExitStatus {
            command: command_text.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}
