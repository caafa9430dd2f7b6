// src/command/shell.rs

//! Leaf command wrapping an external process.

use std::path::{Path, PathBuf};

use tracing::Level;

use crate::command::{Command, CommandOptions, CommandResult, Severity, WorkResult};
use crate::errors::{JobRunnerError, Result};
use crate::exec::{run_to_completion, shell_argv};

/// Runs an argv to completion.
///
/// Exit code 0 is `OK` with stdout as the message. Anything else (including
/// termination by a signal) is `ERROR` with stdout as the message. Captured
/// stderr is attached to `additional_info` in both cases.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    options: CommandOptions,
}

impl ShellCommand {
    pub fn new(argv: Vec<String>, options: CommandOptions) -> Result<Self> {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self {
                argv,
                cwd: None,
                options,
            }),
            _ => Err(JobRunnerError::ConfigError(
                "shell command needs a non-empty program name".to_string(),
            )),
        }
    }

    /// Run `cmd` through the platform shell (`sh -c` / `cmd /C`).
    pub fn from_shell(cmd: &str, options: CommandOptions) -> Result<Self> {
        if cmd.trim().is_empty() {
            return Err(JobRunnerError::ConfigError(
                "shell command line must not be empty".to_string(),
            ));
        }
        Self::new(shell_argv(cmd), options)
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl Command for ShellCommand {
    fn kind(&self) -> &'static str {
        "ShellCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        1
    }

    fn do_work(&mut self) -> WorkResult {
        let output = run_to_completion(&self.argv, self.cwd.as_deref())?;

        self.options.log(
            self.kind(),
            Level::DEBUG,
            format_args!(
                "exit code: {:?}, stdout: {}, stderr: {}",
                output.code,
                output.stdout.trim_end(),
                output.stderr.trim_end()
            ),
        );

        let level = if output.success {
            Severity::Ok
        } else {
            Severity::Error
        };

        Ok(Some(
            CommandResult::new(level)
                .with_message(output.stdout)
                .with_text(output.stderr),
        ))
    }
}
