// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{JobRunnerError, Result};
use crate::exec::shell_argv;
use crate::types::JobKind;

/// Job file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [runner]
/// root = "release"
///
/// [defaults]
/// error_strategy = "stop"
/// logger = "jobs"
///
/// [job.release]
/// kind = "group"
/// steps = ["fetch", "build"]
///
/// [job.fetch]
/// kind = "shell"
/// cmd = "git fetch"
///
/// [job.build]
/// kind = "shell"
/// cmd = ["cargo", "build"]
/// ```
///
/// All sections are optional at this stage; [`ConfigFile`] is the validated
/// form the rest of the crate works with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub defaults: DefaultSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// Validated job file. Built through `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub defaults: DefaultSection,
    pub job: BTreeMap<String, JobConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerSection,
        defaults: DefaultSection,
        job: BTreeMap<String, JobConfig>,
    ) -> Self {
        Self {
            runner,
            defaults,
            job,
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.job.get(name)
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.job.keys().map(|s| s.as_str())
    }

    /// Pick the job to run: an explicit name wins over `[runner].root`; a
    /// file with a single job needs neither.
    pub fn root_job(&self, requested: Option<&str>) -> Result<String> {
        let name = match (requested, self.runner.root.as_deref()) {
            (Some(name), _) | (None, Some(name)) => name.to_string(),
            (None, None) if self.job.len() == 1 => {
                self.job.keys().next().cloned().unwrap_or_default()
            }
            (None, None) => {
                return Err(JobRunnerError::ConfigError(
                    "no job selected: pass --job or set [runner].root".to_string(),
                ));
            }
        };

        if self.job.contains_key(&name) {
            Ok(name)
        } else {
            Err(JobRunnerError::JobNotFound(name))
        }
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSection {
    /// Job executed when none is requested on the command line.
    #[serde(default)]
    pub root: Option<String>,
}

/// `[defaults]` section, applied to jobs that do not set these fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultSection {
    /// `"stop"`, `"omit"` or `"restart"` (any case). Falls back to `"stop"`.
    #[serde(default)]
    pub error_strategy: Option<String>,

    /// Falls back to `"info"`.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Logger name; without one, jobs do not log.
    #[serde(default)]
    pub logger: Option<String>,
}

/// Command line of a shell or background job.
///
/// A string goes through the platform shell; an array is used as argv.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Argv(Vec<String>),
}

impl CommandSpec {
    pub fn to_argv(&self) -> Vec<String> {
        match self {
            CommandSpec::Line(line) => shell_argv(line),
            CommandSpec::Argv(argv) => argv.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CommandSpec::Line(line) => line.trim().is_empty(),
            CommandSpec::Argv(argv) => argv.first().is_none_or(|p| p.trim().is_empty()),
        }
    }
}

/// `[job.<name>]` section.
///
/// Which fields are required depends on `kind`; see `validate.rs`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub kind: JobKind,

    /// `shell` / `background`: what to run.
    #[serde(default)]
    pub cmd: Option<CommandSpec>,

    /// `shell` / `background`: working directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// `group` / `parallel`: child job names, in order.
    #[serde(default)]
    pub steps: Option<Vec<String>>,

    /// `cycle`: the repeated job.
    #[serde(default)]
    pub job: Option<String>,

    /// `cycle`: number of repetitions (>= 1).
    #[serde(default)]
    pub cycles: Option<u32>,

    /// `background`: how long to wait for the worker. Waits forever if unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// `group`: job run when a step raises a fatal fault.
    #[serde(default)]
    pub on_failure: Option<String>,

    /// `group`: bound on whole-group restarts. Unbounded if unset.
    #[serde(default)]
    pub max_restarts: Option<u32>,

    #[serde(default)]
    pub error_strategy: Option<String>,

    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub logger: Option<String>,
}

impl JobConfig {
    /// An empty job of the given kind; mostly useful for building configs in
    /// code.
    pub fn new(kind: JobKind) -> Self {
        Self {
            kind,
            cmd: None,
            cwd: None,
            steps: None,
            job: None,
            cycles: None,
            timeout_ms: None,
            on_failure: None,
            max_restarts: None,
            error_strategy: None,
            log_level: None,
            logger: None,
        }
    }

    /// Every job name this job refers to.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self
            .steps
            .iter()
            .flatten()
            .map(|s| s.as_str())
            .collect();
        refs.extend(self.job.as_deref());
        refs.extend(self.on_failure.as_deref());
        refs
    }

    pub fn effective_error_strategy<'a>(&'a self, defaults: &'a DefaultSection) -> &'a str {
        self.error_strategy
            .as_deref()
            .or(defaults.error_strategy.as_deref())
            .unwrap_or("stop")
    }

    pub fn effective_log_level<'a>(&'a self, defaults: &'a DefaultSection) -> &'a str {
        self.log_level
            .as_deref()
            .or(defaults.log_level.as_deref())
            .unwrap_or("info")
    }

    pub fn effective_logger<'a>(&'a self, defaults: &'a DefaultSection) -> Option<&'a str> {
        self.logger.as_deref().or(defaults.logger.as_deref())
    }
}
