// src/command/parallel.rs

//! Fan children out to worker threads and join them all.

use std::io;
use std::thread;

use anyhow::anyhow;
use tracing::Level;

use crate::command::{
    BoxedCommand, Command, CommandOptions, CommandResult, Fault, ProcessResult, RunnerFatalError,
    WorkResult, panic_message, reports_failure, total_work,
};

/// What one worker thread ended with.
enum WorkerOutcome {
    Finished(ProcessResult),
    Panicked(String),
    NotStarted(io::Error),
}

/// Runs every child on its own scoped thread and waits for all of them.
///
/// Siblings are never cancelled. Once everything joined, the outcome is picked
/// in this order, each time the first one in child order:
/// 1. a fatal fault (re-raised),
/// 2. a panicked or unspawnable worker (unexpected fault),
/// 3. a returned child result the child did not omit,
/// 4. otherwise success.
pub struct ParallelCommand {
    commands: Vec<BoxedCommand>,
    work_count: u64,
    options: CommandOptions,
}

impl ParallelCommand {
    pub fn new(commands: Vec<BoxedCommand>, options: CommandOptions) -> Self {
        let work_count = total_work(&commands);
        Self {
            commands,
            work_count,
            options,
        }
    }

    pub fn commands(&self) -> &[BoxedCommand] {
        &self.commands
    }

    fn run_workers(&mut self) -> Vec<WorkerOutcome> {
        thread::scope(|scope| {
            // Spawn everything before joining anything.
            let handles: Vec<_> = self
                .commands
                .iter_mut()
                .enumerate()
                .map(|(index, child)| {
                    thread::Builder::new()
                        .name(format!("parallel-{index}"))
                        .spawn_scoped(scope, move || child.process())
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle {
                    Ok(handle) => match handle.join() {
                        Ok(result) => WorkerOutcome::Finished(result),
                        Err(payload) => WorkerOutcome::Panicked(panic_message(payload.as_ref())),
                    },
                    Err(err) => WorkerOutcome::NotStarted(err),
                })
                .collect()
        })
    }
}

impl Command for ParallelCommand {
    fn kind(&self) -> &'static str {
        "ParallelCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        self.work_count
    }

    fn do_work(&mut self) -> WorkResult {
        self.options.log(
            self.kind(),
            Level::DEBUG,
            format_args!("starting {} workers", self.commands.len()),
        );

        let outcomes = self.run_workers();

        let mut fatal: Option<RunnerFatalError> = None;
        let mut unexpected: Option<anyhow::Error> = None;
        let mut reported: Option<CommandResult> = None;

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                WorkerOutcome::Finished(Ok(result)) => {
                    if reported.is_none()
                        && reports_failure(self.commands[index].as_ref(), &result)
                    {
                        reported = Some(result);
                    }
                }
                WorkerOutcome::Finished(Err(err)) => {
                    self.options.log(
                        self.kind(),
                        Level::WARN,
                        format_args!("worker {index} raised {err}"),
                    );
                    fatal.get_or_insert(err);
                }
                WorkerOutcome::Panicked(message) => {
                    self.options.log(
                        self.kind(),
                        Level::WARN,
                        format_args!("worker {index} panicked: {message}"),
                    );
                    unexpected.get_or_insert_with(|| anyhow!("worker {index} panicked: {message}"));
                }
                WorkerOutcome::NotStarted(err) => {
                    self.options.log(
                        self.kind(),
                        Level::WARN,
                        format_args!("worker {index} could not be started: {err}"),
                    );
                    unexpected.get_or_insert_with(|| {
                        anyhow::Error::new(err).context(format!("starting worker {index}"))
                    });
                }
            }
        }

        if let Some(fatal) = fatal {
            return Err(Fault::Fatal(fatal));
        }
        if let Some(err) = unexpected {
            return Err(Fault::Unexpected(err));
        }
        Ok(reported)
    }
}
