// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! [`JobRunnerError`] covers everything that happens *around* execution:
//! loading job files, validating them and building command trees. Failures
//! that happen *during* execution are expressed with the engine vocabulary in
//! [`crate::command::outcome`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobRunnerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Cycle detected between jobs: {0}")]
    JobCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, JobRunnerError>;
