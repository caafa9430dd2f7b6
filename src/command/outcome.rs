// src/command/outcome.rs

//! Outcome vocabulary shared by every command.
//!
//! - [`CommandResult`] is what a command reports.
//! - [`RunnerFatalError`] is the only fault the engine lets escape from
//!   `process()`; it is raised for `CRITICAL` outcomes.
//! - [`Fault`] is what `do_work()` may fail with.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Severity of an outcome, ordered by escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Ok => "OK",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// One opaque diagnostic value attached to a result.
#[derive(Debug, Clone)]
pub enum Detail {
    /// Free text, e.g. captured stderr.
    Text(String),
    /// A fault caught while doing the work.
    Fault(Arc<anyhow::Error>),
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Text(text) => f.write_str(text),
            Detail::Fault(err) => write!(f, "{err:#}"),
        }
    }
}

/// Immutable outcome of one unit of work.
///
/// Only `level` drives control flow; `message` and `additional_info` are for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct CommandResult {
    level: Severity,
    message: Option<String>,
    additional_info: Vec<Detail>,
}

impl CommandResult {
    pub fn new(level: Severity) -> Self {
        Self {
            level,
            message: None,
            additional_info: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(Severity::Ok)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error).with_message(message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_info(mut self, detail: Detail) -> Self {
        self.additional_info.push(detail);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_info(Detail::Text(text.into()))
    }

    pub fn with_fault(self, fault: anyhow::Error) -> Self {
        self.with_info(Detail::Fault(Arc::new(fault)))
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn additional_info(&self) -> &[Detail] {
        &self.additional_info
    }

    pub fn is_ok(&self) -> bool {
        self.level == Severity::Ok
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandResult({})", self.level)
    }
}

/// Fault raised for a `CRITICAL` outcome.
///
/// Carries the triggering result and the engine attempt it happened on. It
/// unwinds through every enclosing command except a sequential group whose
/// own strategy is `omit` or `restart`.
#[derive(Debug, Clone, Error)]
#[error("RunnerFatalError({result}, {retry})")]
pub struct RunnerFatalError {
    result: CommandResult,
    retry: u32,
}

impl RunnerFatalError {
    pub fn new(result: CommandResult, retry: u32) -> Self {
        Self { result, retry }
    }

    pub fn result(&self) -> &CommandResult {
        &self.result
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }
}

/// Failure of `do_work()`.
#[derive(Debug, Error)]
pub enum Fault {
    /// Must propagate as-is.
    #[error(transparent)]
    Fatal(#[from] RunnerFatalError),

    /// Anything else; the engine turns it into an `ERROR` result.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Return type of `do_work()`. `Ok(None)` counts as success.
pub type WorkResult = std::result::Result<Option<CommandResult>, Fault>;

/// Return type of `process()`.
pub type ProcessResult = std::result::Result<CommandResult, RunnerFatalError>;
