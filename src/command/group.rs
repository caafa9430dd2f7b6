// src/command/group.rs

//! Sequential group of commands treated as one unit.

use tracing::Level;

use crate::command::{
    BoxedCommand, Command, CommandOptions, CommandResult, RunnerFatalError, WorkResult,
    reports_failure, total_work,
};
use crate::types::ErrorStrategy;

/// Hook called with the step that raised a fatal fault and the fault's
/// result. A returned command is run once before the group's strategy is
/// applied.
pub type ResetHook = Box<dyn FnMut(&dyn Command, &CommandResult) -> Option<BoxedCommand> + Send>;

/// Runs its children in order.
///
/// - Every child runs even when an earlier one returned `ERROR` or
///   `CRITICAL`. The first such result the child did not omit becomes the
///   group's own, so the group's engine applies the group's strategy to it.
/// - A child's fatal fault first goes through the reset hook, then the
///   group's strategy: `omit` swallows it, `stop` re-raises it unchanged,
///   `restart` runs the whole group again from the first child.
///
/// Group restarts are counted separately from engine attempts and bounded only
/// by `max_restarts` (unbounded when `None`).
pub struct GroupCommand {
    commands: Vec<BoxedCommand>,
    reset_hook: Option<ResetHook>,
    max_restarts: Option<u32>,
    restarts: u32,
    work_count: u64,
    options: CommandOptions,
}

impl GroupCommand {
    pub fn new(commands: Vec<BoxedCommand>, options: CommandOptions) -> Self {
        let work_count = total_work(&commands);
        Self {
            commands,
            reset_hook: None,
            max_restarts: None,
            restarts: 0,
            work_count,
            options,
        }
    }

    pub fn with_reset_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&dyn Command, &CommandResult) -> Option<BoxedCommand> + Send + 'static,
    {
        self.reset_hook = Some(Box::new(hook));
        self
    }

    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = Some(max_restarts);
        self
    }

    pub fn add_command(&mut self, command: BoxedCommand) {
        self.work_count = self.work_count.saturating_add(command.work_count());
        self.commands.push(command);
    }

    pub fn set_commands(&mut self, commands: Vec<BoxedCommand>) {
        self.work_count = total_work(&commands);
        self.commands = commands;
    }

    pub fn commands(&self) -> &[BoxedCommand] {
        &self.commands
    }

    /// Group restarts performed during the most recent `do_work()`.
    pub fn restart_count(&self) -> u32 {
        self.restarts
    }

    /// Run every child once. A fatal fault stops the run and comes back with
    /// the index of the child that raised it.
    fn run_children(&mut self) -> Result<Option<CommandResult>, (usize, RunnerFatalError)> {
        let mut reported: Option<CommandResult> = None;
        for (index, child) in self.commands.iter_mut().enumerate() {
            match child.process() {
                Ok(result) if reported.is_none() && reports_failure(child.as_ref(), &result) => {
                    self.options.log(
                        "GroupCommand",
                        Level::INFO,
                        format_args!("step {index} finished with {result}"),
                    );
                    reported = Some(result);
                }
                Ok(_) => {}
                Err(fatal) => return Err((index, fatal)),
            }
        }
        Ok(reported)
    }

    fn run_reset_hook(&mut self, index: usize, fatal: &RunnerFatalError) {
        let Some(hook) = self.reset_hook.as_mut() else {
            return;
        };
        let Some(mut replacement) = hook(self.commands[index].as_ref(), fatal.result()) else {
            return;
        };

        self.options.log(
            "GroupCommand",
            Level::INFO,
            format_args!("running reset command ({}) for step {index}", replacement.kind()),
        );

        // The replacement's outcome does not influence the group.
        match replacement.process() {
            Ok(result) => self.options.log(
                "GroupCommand",
                Level::DEBUG,
                format_args!("reset command finished with {result}"),
            ),
            Err(err) => self.options.log(
                "GroupCommand",
                Level::WARN,
                format_args!("reset command failed: {err}"),
            ),
        }
    }
}

impl Command for GroupCommand {
    fn kind(&self) -> &'static str {
        "GroupCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        self.work_count
    }

    fn do_work(&mut self) -> WorkResult {
        self.restarts = 0;

        loop {
            let (index, fatal) = match self.run_children() {
                Ok(outcome) => return Ok(outcome),
                Err(failed) => failed,
            };

            self.run_reset_hook(index, &fatal);

            match self.options.error_strategy {
                ErrorStrategy::Omit => {
                    self.options.log(
                        self.kind(),
                        Level::INFO,
                        format_args!("omitting fatal fault from step {index}: {fatal}"),
                    );
                    return Ok(None);
                }
                ErrorStrategy::Stop => return Err(fatal.into()),
                ErrorStrategy::Restart => {
                    if self.max_restarts.is_some_and(|max| self.restarts >= max) {
                        self.options.log(
                            self.kind(),
                            Level::ERROR,
                            format_args!("restart limit reached after {} restarts", self.restarts),
                        );
                        return Err(fatal.into());
                    }
                    self.restarts += 1;
                    self.options.log(
                        self.kind(),
                        Level::INFO,
                        format_args!(
                            "restarting group after fault in step {index} (restart {})",
                            self.restarts
                        ),
                    );
                }
            }
        }
    }
}
