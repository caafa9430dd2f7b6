// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod counter;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod timer;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::command::{Command, ProcessResult, Severity};
use crate::config::build_job;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::counter::WorkCounter;
use crate::types::{ErrorStrategy, JobKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading and validation
/// - command tree construction
/// - execution on a blocking worker
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = Arc::new(load_and_validate(&args.config)?);
    let root = cfg.root_job(args.job.as_deref())?;

    let counter = WorkCounter::new();
    let mut command = build_job(&cfg, &root, &counter)?;
    let works_total = command.work_count();

    if args.dry_run {
        print_dry_run(&cfg, &root, works_total);
        return Ok(());
    }

    let root_strategy = command.options().error_strategy;
    info!(job = %root, works_total, "starting job tree");

    // `process()` blocks; keep it off the async runtime threads.
    let worker = tokio::task::spawn_blocking(move || command.process());

    let outcome = tokio::select! {
        joined = worker => joined.context("job tree worker panicked")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            warn!(
                job = %root,
                works_done = counter.get_count(),
                "interrupted; abandoning running jobs"
            );
            bail!("interrupted by Ctrl+C");
        }
    };

    finish(&root, root_strategy, outcome, counter.get_count(), works_total)
}

/// Build and run job `root` synchronously on the calling thread.
pub fn execute(cfg: &Arc<ConfigFile>, root: &str, counter: &WorkCounter) -> Result<ProcessResult> {
    let mut command = build_job(cfg, root, counter)?;
    Ok(command.process())
}

/// Map the root outcome to the process result.
///
/// An `ERROR` the root job itself chose to omit still counts as success.
fn finish(
    root: &str,
    root_strategy: ErrorStrategy,
    outcome: ProcessResult,
    works_done: u64,
    works_total: u64,
) -> Result<()> {
    match outcome {
        Ok(result) => match result.level() {
            Severity::Ok => {
                info!(job = %root, works_done, works_total, "job tree finished");
                Ok(())
            }
            Severity::Error if root_strategy == ErrorStrategy::Omit => {
                warn!(job = %root, works_done, works_total, "job tree finished with omitted error");
                Ok(())
            }
            _ => {
                warn!(job = %root, works_done, works_total, %result, "job tree did not succeed");
                bail!(
                    "job '{root}' finished with {result}: {}",
                    result.message().unwrap_or("").trim()
                )
            }
        },
        Err(fatal) => {
            error!(job = %root, works_done, works_total, error = %fatal, "job tree failed");
            Err(anyhow::Error::new(fatal).context(format!("job '{root}' failed")))
        }
    }
}

/// Dry-run output: print the job tree below `root`.
fn print_dry_run(cfg: &ConfigFile, root: &str, works_total: u64) {
    println!("jobrunner dry-run");
    println!("  root = {root}");
    println!("  works_total = {works_total}");
    println!();
    print_job(cfg, root, 1);

    debug!("dry-run complete (no execution)");
}

fn print_job(cfg: &ConfigFile, name: &str, depth: usize) {
    let Some(job) = cfg.job(name) else {
        return;
    };
    let indent = "  ".repeat(depth);
    println!(
        "{indent}- {name} ({}, error_strategy = {})",
        job.kind,
        job.effective_error_strategy(&cfg.defaults)
    );

    match job.kind {
        JobKind::Shell | JobKind::Background => {
            if let Some(cmd) = &job.cmd {
                println!("{indent}    cmd: {:?}", cmd.to_argv());
            }
            if let Some(timeout) = job.timeout_ms {
                println!("{indent}    timeout_ms: {timeout}");
            }
        }
        JobKind::Cycle => {
            println!("{indent}    cycles: {}", job.cycles.unwrap_or_default());
        }
        JobKind::Group | JobKind::Parallel => {
            if let Some(reset) = &job.on_failure {
                println!("{indent}    on_failure: {reset}");
            }
            if let Some(max) = job.max_restarts {
                println!("{indent}    max_restarts: {max}");
            }
        }
    }

    for child in job.steps.iter().flatten().chain(job.job.iter()) {
        print_job(cfg, child, depth + 1);
    }
}
