// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, DefaultSection, JobConfig, RawConfigFile};
use crate::errors::{JobRunnerError, Result};
use crate::logging::parse_level_str;
use crate::types::{ErrorStrategy, JobKind};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::JobRunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.defaults, raw.job))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_runner(cfg)?;
    validate_defaults(&cfg.defaults)?;
    for (name, job) in cfg.job.iter() {
        validate_job_fields(name, job)?;
    }
    validate_job_references(cfg)?;
    validate_acyclic(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(JobRunnerError::ConfigError(
            "job file must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if let Some(root) = cfg.runner.root.as_deref() {
        if !cfg.job.contains_key(root) {
            return Err(JobRunnerError::JobNotFound(format!(
                "[runner].root refers to unknown job '{root}'"
            )));
        }
    }
    Ok(())
}

fn validate_defaults(defaults: &DefaultSection) -> Result<()> {
    if let Some(strategy) = defaults.error_strategy.as_deref() {
        parse_strategy("[defaults]", strategy)?;
    }
    if let Some(level) = defaults.log_level.as_deref() {
        parse_level("[defaults]", level)?;
    }
    Ok(())
}

fn parse_strategy(owner: &str, strategy: &str) -> Result<ErrorStrategy> {
    strategy
        .parse()
        .map_err(|e| JobRunnerError::ConfigError(format!("{owner}: {e}")))
}

fn parse_level(owner: &str, level: &str) -> Result<tracing::Level> {
    parse_level_str(level).ok_or_else(|| {
        JobRunnerError::ConfigError(format!(
            "{owner}: invalid log_level '{level}' (expected error, warn, info, debug or trace)"
        ))
    })
}

fn validate_job_fields(name: &str, job: &JobConfig) -> Result<()> {
    let owner = format!("job '{name}'");

    if let Some(strategy) = job.error_strategy.as_deref() {
        parse_strategy(&owner, strategy)?;
    }
    if let Some(level) = job.log_level.as_deref() {
        parse_level(&owner, level)?;
    }

    let missing = |field: &str| {
        JobRunnerError::ConfigError(format!(
            "{owner} of kind '{}' requires `{field}`",
            job.kind
        ))
    };

    match job.kind {
        JobKind::Shell | JobKind::Background => match &job.cmd {
            None => return Err(missing("cmd")),
            Some(cmd) if cmd.is_empty() => {
                return Err(JobRunnerError::ConfigError(format!(
                    "{owner} has an empty `cmd`"
                )));
            }
            Some(_) => {}
        },
        JobKind::Group | JobKind::Parallel => {
            if job.steps.is_none() {
                return Err(missing("steps"));
            }
        }
        JobKind::Cycle => {
            if job.job.is_none() {
                return Err(missing("job"));
            }
            match job.cycles {
                None => return Err(missing("cycles")),
                Some(0) => {
                    return Err(JobRunnerError::ConfigError(format!(
                        "{owner}: cycles must be >= 1 (got 0)"
                    )));
                }
                Some(_) => {}
            }
        }
    }

    if job.on_failure.is_some() && job.kind != JobKind::Group {
        return Err(JobRunnerError::ConfigError(format!(
            "{owner}: `on_failure` is only supported on group jobs"
        )));
    }
    if job.max_restarts.is_some() && job.kind != JobKind::Group {
        return Err(JobRunnerError::ConfigError(format!(
            "{owner}: `max_restarts` is only supported on group jobs"
        )));
    }

    Ok(())
}

fn validate_job_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        for dep in job.references() {
            if !cfg.job.contains_key(dep) {
                return Err(JobRunnerError::ConfigError(format!(
                    "job '{}' refers to unknown job '{}'",
                    name, dep
                )));
            }
            if dep == name {
                return Err(JobRunnerError::ConfigError(format!(
                    "job '{}' cannot refer to itself",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: parent -> referenced job.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.job.keys() {
        graph.add_node(name.as_str());
    }

    for (name, job) in cfg.job.iter() {
        for dep in job.references() {
            graph.add_edge(name.as_str(), dep, ());
        }
    }

    // Building a job that (transitively) contains itself would never end.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(JobRunnerError::JobCycle(format!(
                "cycle detected between jobs involving '{}'",
                node
            )))
        }
    }
}
