// src/config/mod.rs

//! Job file loading, validation and tree building.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate references, cycles and per-kind fields (`validate.rs`).
//! - Build the command tree for a job (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::build_job;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{CommandSpec, ConfigFile, DefaultSection, JobConfig, RawConfigFile, RunnerSection};
