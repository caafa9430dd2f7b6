// src/exec/process.rs

//! OS process helpers.
//!
//! Leaf commands run to completion on the calling thread. Background
//! processes are supervised on tokio so cancellation can race process exit.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use crate::exec::cancel::CancellationToken;

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Build an argv that runs `cmd` through the platform shell.
pub fn shell_argv(cmd: &str) -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string(), cmd.to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string(), cmd.to_string()]
    }
}

fn build_command(argv: &[String], cwd: Option<&Path>) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("cannot spawn an empty command line"))?;

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

/// Run `argv` synchronously, capturing stdout and stderr.
pub fn run_to_completion(argv: &[String], cwd: Option<&Path>) -> Result<ProcessOutput> {
    let mut cmd = build_command(argv, cwd)?;

    info!(?argv, ?cwd, "starting process");

    let output = cmd
        .output()
        .with_context(|| format!("spawning process {argv:?}"))?;

    let code = output.status.code();
    let success = output.status.success();

    info!(?argv, exit_code = ?code, success, "process exited");

    Ok(ProcessOutput {
        code,
        success,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run `argv` until it exits or `token` is cancelled.
///
/// Output is discarded. Returns `None` when the process was killed because of
/// cancellation. The child is also killed if this future is dropped.
pub async fn run_until_cancelled(
    argv: &[String],
    cwd: Option<&Path>,
    token: &CancellationToken,
) -> Result<Option<ExitStatus>> {
    let mut cmd = tokio::process::Command::from(build_command(argv, cwd)?);
    cmd.stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    info!(?argv, ?cwd, "starting background process");

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning background process {argv:?}"))?;

    tokio::select! {
        status = child.wait() => {
            let status = status
                .with_context(|| format!("waiting for background process {argv:?}"))?;
            info!(?argv, exit_code = ?status.code(), "background process exited");
            Ok(Some(status))
        }
        _ = token.cancelled() => {
            info!(?argv, "cancellation requested; killing background process");
            // `kill` also reaps the child.
            if let Err(e) = child.kill().await {
                warn!(?argv, error = %e, "failed to kill background process");
            }
            Ok(None)
        }
    }
}
