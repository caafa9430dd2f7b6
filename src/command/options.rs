// src/command/options.rs

//! Per-command configuration and the per-command logger.

use std::fmt::Display;

use tracing::{Level, debug, error, info, trace, warn};

use crate::counter::WorkCounter;
use crate::errors::{JobRunnerError, Result};
use crate::logging::parse_level_str;
use crate::types::ErrorStrategy;

/// Options recognised by every command kind.
///
/// Defaults: `stop` strategy, `INFO` log level, logging disabled (no logger
/// name) and a fresh, unshared counter.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    /// What to do with an `ERROR` outcome of this command's own work.
    pub error_strategy: ErrorStrategy,

    /// Most verbose level this command emits.
    pub log_level: Level,

    /// Name reported in the `logger` field of every event.
    ///
    /// `None` disables logging for the command entirely.
    pub logger_name: Option<String>,

    /// Counter incremented once per successful run of this command.
    pub counter: WorkCounter,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            error_strategy: ErrorStrategy::default(),
            log_level: Level::INFO,
            logger_name: None,
            counter: WorkCounter::new(),
        }
    }
}

impl CommandOptions {
    /// Default options reporting into `counter`.
    pub fn new(counter: WorkCounter) -> Self {
        Self {
            counter,
            ..Self::default()
        }
    }

    pub fn with_error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.error_strategy = strategy;
        self
    }

    /// Set the strategy from its textual name (case-insensitive).
    pub fn parse_error_strategy(self, strategy: &str) -> Result<Self> {
        let strategy = strategy.parse().map_err(JobRunnerError::ConfigError)?;
        Ok(self.with_error_strategy(strategy))
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set the log level from its textual name ("error" .. "trace").
    pub fn parse_log_level(self, level: &str) -> Result<Self> {
        let parsed = parse_level_str(level).ok_or_else(|| {
            JobRunnerError::ConfigError(format!(
                "invalid log_level: {level} (expected error, warn, info, debug or trace)"
            ))
        })?;
        Ok(self.with_log_level(parsed))
    }

    pub fn with_logger(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    /// Emit `message` for `command` if a logger is configured and `level`
    /// passes this command's threshold.
    pub(crate) fn log(&self, command: &str, level: Level, message: impl Display) {
        let Some(logger) = self.logger_name.as_deref() else {
            return;
        };
        if level > self.log_level {
            return;
        }

        let works_done = self.counter.get_count();
        match level {
            Level::ERROR => error!(logger, command, works_done, "{message}"),
            Level::WARN => warn!(logger, command, works_done, "{message}"),
            Level::INFO => info!(logger, command, works_done, "{message}"),
            Level::DEBUG => debug!(logger, command, works_done, "{message}"),
            _ => trace!(logger, command, works_done, "{message}"),
        }
    }
}
