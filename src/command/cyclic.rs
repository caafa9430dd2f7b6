// src/command/cyclic.rs

//! Repeat one command a fixed number of times.

use tracing::Level;

use crate::command::{
    BoxedCommand, Command, CommandOptions, CommandResult, WorkResult, reports_failure,
};
use crate::errors::{JobRunnerError, Result};

/// Runs its child `cycles` times, strictly one after another.
///
/// A fatal fault on any cycle aborts the remaining cycles and propagates.
/// Returned results never end the loop; the first one the child did not omit
/// becomes this command's result once every cycle ran.
pub struct CyclicCommand {
    command: BoxedCommand,
    cycles: u32,
    work_count: u64,
    options: CommandOptions,
}

impl CyclicCommand {
    pub fn new(command: BoxedCommand, cycles: u32, options: CommandOptions) -> Result<Self> {
        if cycles == 0 {
            return Err(JobRunnerError::ConfigError(
                "cyclic command needs cycles >= 1 (got 0)".to_string(),
            ));
        }
        let work_count = command.work_count().saturating_mul(u64::from(cycles));
        Ok(Self {
            command,
            cycles,
            work_count,
            options,
        })
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

impl Command for CyclicCommand {
    fn kind(&self) -> &'static str {
        "CyclicCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        self.work_count
    }

    fn do_work(&mut self) -> WorkResult {
        let mut reported: Option<CommandResult> = None;

        for cycle in 1..=self.cycles {
            self.options.log(
                "CyclicCommand",
                Level::DEBUG,
                format_args!("cycle {cycle}/{}", self.cycles),
            );

            let result = self.command.process()?;

            if reported.is_none() && reports_failure(self.command.as_ref(), &result) {
                self.options.log(
                    "CyclicCommand",
                    Level::INFO,
                    format_args!("cycle {cycle} finished with {result}"),
                );
                reported = Some(result);
            }
        }
        Ok(reported)
    }
}
