// src/command/mod.rs

//! Command abstraction and the built-in command kinds.
//!
//! Every unit of work implements [`Command`]. Implementors only provide
//! `do_work()`; the provided `process()` wraps it in the shared execution
//! engine ([`engine`]), which applies the command's error strategy, retries,
//! timing, logging and work counting.
//!
//! - [`shell`]: leaf command running an external process.
//! - [`group`]: children run in order, group-level strategy and reset hook.
//! - [`cyclic`]: one child run a fixed number of times.
//! - [`parallel`]: children run on one worker thread each.
//! - [`thread`]: a callable run on a worker thread with an optional timeout.

pub mod cyclic;
pub mod engine;
pub mod group;
pub mod options;
pub mod outcome;
pub mod parallel;
pub mod shell;
pub mod thread;

pub use cyclic::CyclicCommand;
pub use group::{GroupCommand, ResetHook};
pub use options::CommandOptions;
pub use outcome::{
    CommandResult, Detail, Fault, ProcessResult, RunnerFatalError, Severity, WorkResult,
};
pub use parallel::ParallelCommand;
pub use shell::ShellCommand;
pub use thread::{BackgroundTask, ThreadCommand};

use std::any::Any;

use crate::types::ErrorStrategy;

/// Owned, type-erased command. Parents own their children this way.
pub type BoxedCommand = Box<dyn Command>;

/// Uniform contract of every unit of work.
///
/// A command is not re-entrant: `process` takes `&mut self`, so one instance
/// can only run on one thread at a time.
pub trait Command: Send {
    /// Short name of the command kind, reported in logs.
    fn kind(&self) -> &'static str;

    fn options(&self) -> &CommandOptions;

    /// Units of work this command declares, fixed at construction.
    fn work_count(&self) -> u64;

    /// Perform the work once.
    ///
    /// Return `Ok(None)` for a plain success. Raise [`Fault::Fatal`] only to
    /// propagate a child's fatal fault; any other failure should be
    /// [`Fault::Unexpected`], which the engine downgrades to `ERROR`.
    fn do_work(&mut self) -> WorkResult;

    /// Run the work under the execution engine.
    fn process(&mut self) -> ProcessResult {
        engine::process(self)
    }

    fn number_of_works(&self) -> u64 {
        self.work_count()
    }
}

/// Whether a composite reports a child's returned result as its own.
///
/// Successes and errors the child chose to omit are not reported. A composite
/// keeps running its remaining children either way and only ends early on a
/// raised fault; the first reported result becomes the composite's result.
pub(crate) fn reports_failure(child: &dyn Command, result: &CommandResult) -> bool {
    match result.level() {
        Severity::Ok => false,
        Severity::Error => child.options().error_strategy != ErrorStrategy::Omit,
        Severity::Critical => true,
    }
}

/// Sum of the declared work of `commands`, saturating at `u64::MAX`.
pub(crate) fn total_work(commands: &[BoxedCommand]) -> u64 {
    commands
        .iter()
        .fold(0u64, |total, c| total.saturating_add(c.work_count()))
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
