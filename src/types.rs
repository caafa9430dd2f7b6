use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What a command does when its own work reports an `ERROR` outcome.
///
/// - `Stop`: hand the error back to the caller as a result (default).
/// - `Omit`: hand the error back as well, but flagged as a non-fatal
///   completion; enclosing composites keep going.
/// - `Restart`: run the work again, up to the engine's attempt cap.
///
/// `CRITICAL` outcomes ignore the strategy and always escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    Stop,
    Omit,
    Restart,
}

impl Default for ErrorStrategy {
    fn default() -> Self {
        ErrorStrategy::Stop
    }
}

impl FromStr for ErrorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(ErrorStrategy::Stop),
            "omit" => Ok(ErrorStrategy::Omit),
            "restart" => Ok(ErrorStrategy::Restart),
            other => Err(format!(
                "invalid error_strategy: {other} (expected \"stop\", \"omit\" or \"restart\")"
            )),
        }
    }
}

impl fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorStrategy::Stop => "stop",
            ErrorStrategy::Omit => "omit",
            ErrorStrategy::Restart => "restart",
        };
        f.write_str(s)
    }
}

/// Kind of a job declared in a job file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// Run an external process.
    Shell,
    /// Run `steps` one after another.
    Group,
    /// Run `job` `cycles` times.
    Cycle,
    /// Run `steps` concurrently.
    Parallel,
    /// Run `cmd` on a worker thread with an optional timeout.
    Background,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobKind::Shell => "shell",
            JobKind::Group => "group",
            JobKind::Cycle => "cycle",
            JobKind::Parallel => "parallel",
            JobKind::Background => "background",
        };
        f.write_str(s)
    }
}
