// src/config/build.rs

//! Turn a validated job file into a command tree.
//!
//! Every reference to a job builds a fresh command, so a job used by two
//! parents yields two independent instances and each parent owns its
//! children exclusively. Building never runs anything.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::command::{
    BoxedCommand, Command, CommandOptions, CommandResult, CyclicCommand, GroupCommand,
    ParallelCommand, ShellCommand, ThreadCommand,
};
use crate::config::model::{CommandSpec, ConfigFile, JobConfig};
use crate::counter::WorkCounter;
use crate::errors::{JobRunnerError, Result};
use crate::exec::{CancellationToken, run_until_cancelled};
use crate::types::JobKind;

/// Build the command for job `name`, with every command reporting into
/// `counter`.
pub fn build_job(
    cfg: &Arc<ConfigFile>,
    name: &str,
    counter: &WorkCounter,
) -> Result<BoxedCommand> {
    let job = cfg
        .job(name)
        .ok_or_else(|| JobRunnerError::JobNotFound(name.to_string()))?;
    let options = job_options(cfg, job, counter)?;

    let command: BoxedCommand = match job.kind {
        JobKind::Shell => {
            let mut shell = ShellCommand::new(required_cmd(name, job)?.to_argv(), options)?;
            if let Some(cwd) = &job.cwd {
                shell = shell.with_cwd(cwd);
            }
            Box::new(shell)
        }
        JobKind::Group => {
            let mut group = GroupCommand::new(build_steps(cfg, job, counter)?, options);
            if let Some(max_restarts) = job.max_restarts {
                group = group.with_max_restarts(max_restarts);
            }
            if let Some(reset_job) = job.on_failure.as_deref() {
                group = group.with_reset_hook(reset_hook(cfg, reset_job, counter));
            }
            Box::new(group)
        }
        JobKind::Cycle => {
            let child_name = job.job.as_deref().ok_or_else(|| missing(name, "job"))?;
            let cycles = job.cycles.ok_or_else(|| missing(name, "cycles"))?;
            let child = build_job(cfg, child_name, counter)?;
            Box::new(CyclicCommand::new(child, cycles, options)?)
        }
        JobKind::Parallel => Box::new(ParallelCommand::new(
            build_steps(cfg, job, counter)?,
            options,
        )),
        JobKind::Background => {
            let argv = required_cmd(name, job)?.to_argv();
            let timeout = job.timeout_ms.map(Duration::from_millis);
            Box::new(ThreadCommand::new(
                background_process(argv, job.cwd.clone()),
                timeout,
                options,
            ))
        }
    };

    debug!(job = name, kind = %job.kind, works = command.work_count(), "built job");
    Ok(command)
}

fn missing(name: &str, field: &str) -> JobRunnerError {
    JobRunnerError::ConfigError(format!("job '{name}' requires `{field}`"))
}

fn required_cmd<'a>(name: &str, job: &'a JobConfig) -> Result<&'a CommandSpec> {
    job.cmd.as_ref().ok_or_else(|| missing(name, "cmd"))
}

fn job_options(
    cfg: &ConfigFile,
    job: &JobConfig,
    counter: &WorkCounter,
) -> Result<CommandOptions> {
    let mut options = CommandOptions::new(counter.clone())
        .parse_error_strategy(job.effective_error_strategy(&cfg.defaults))?
        .parse_log_level(job.effective_log_level(&cfg.defaults))?;
    if let Some(logger) = job.effective_logger(&cfg.defaults) {
        options = options.with_logger(logger);
    }
    Ok(options)
}

fn build_steps(
    cfg: &Arc<ConfigFile>,
    job: &JobConfig,
    counter: &WorkCounter,
) -> Result<Vec<BoxedCommand>> {
    job.steps
        .iter()
        .flatten()
        .map(|step| build_job(cfg, step, counter))
        .collect()
}

/// Reset hook that builds job `reset_job` afresh every time a step fails.
fn reset_hook(
    cfg: &Arc<ConfigFile>,
    reset_job: &str,
    counter: &WorkCounter,
) -> impl FnMut(&dyn Command, &CommandResult) -> Option<BoxedCommand> + Send + 'static {
    let cfg = Arc::clone(cfg);
    let reset_job = reset_job.to_string();
    let counter = counter.clone();

    move |failed, result| {
        info!(
            job = %reset_job,
            failed = failed.kind(),
            %result,
            "building reset job for failed step"
        );
        match build_job(&cfg, &reset_job, &counter) {
            Ok(command) => Some(command),
            Err(err) => {
                warn!(job = %reset_job, error = %err, "could not build reset job");
                None
            }
        }
    }
}

/// Background callable running `argv` until it exits or the token fires.
///
/// The worker thread drives the process on its own current-thread runtime.
fn background_process(
    argv: Vec<String>,
    cwd: Option<PathBuf>,
) -> impl Fn(&CancellationToken) + Send + Sync + 'static {
    move |token| {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(?argv, error = %err, "could not start runtime for background job");
                return;
            }
        };

        match runtime.block_on(run_until_cancelled(&argv, cwd.as_deref(), token)) {
            Ok(Some(status)) if !status.success() => {
                warn!(?argv, exit_code = ?status.code(), "background job exited with failure");
            }
            Ok(_) => {}
            Err(err) => warn!(?argv, error = %err, "background job failed"),
        }
    }
}
