// src/command/engine.rs

//! Execution engine shared by every command.
//!
//! One call to [`process`] runs the command's `do_work()` up to
//! [`MAX_ATTEMPTS`] times and decides what the caller sees:
//!
//! | outcome of `do_work()`    | result of `process()`                          |
//! |---------------------------|------------------------------------------------|
//! | `OK` / `Ok(None)`         | counter incremented, `Ok(result)`              |
//! | `ERROR`, strategy `omit`  | `Ok(result)`                                   |
//! | `ERROR`, strategy `stop`  | `Ok(result)`                                   |
//! | `ERROR`, strategy `restart` | next attempt                                 |
//! | `CRITICAL`                | `Err(RunnerFatalError(result, attempt))`       |
//! | `Fault::Fatal`            | re-raised unchanged                            |
//! | `Fault::Unexpected`       | treated as an `ERROR` result                   |
//! | panic in `do_work()`      | treated as an `ERROR` result                   |
//!
//! When every attempt ended in a restarted `ERROR`, a `CRITICAL` result is
//! returned (not raised).

use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use tracing::Level;

use crate::command::{Command, panic_message};
use crate::command::outcome::{CommandResult, Fault, ProcessResult, RunnerFatalError, Severity};
use crate::timer::Timer;
use crate::types::ErrorStrategy;

/// Attempts one `process()` call may make before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

pub const CANNOT_RUN_MESSAGE: &str = "cannot run process";
pub const UNEXPECTED_FAULT_MESSAGE: &str = "unexpected fault caught";

/// Run `command` under the engine.
pub fn process<C: Command + ?Sized>(command: &mut C) -> ProcessResult {
    let kind = command.kind();

    for attempt in 1..=MAX_ATTEMPTS {
        let mut timer = Timer::start();

        let work = panic::catch_unwind(AssertUnwindSafe(|| command.do_work()))
            .unwrap_or_else(|payload| {
                Err(Fault::Unexpected(anyhow!(
                    "{kind} panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        let result = match work {
            Ok(Some(result)) => result,
            Ok(None) => CommandResult::ok(),
            Err(Fault::Fatal(fatal)) => {
                timer.add_checkpoint("fatal fault raised");
                timer.stop();
                let options = command.options();
                options.log(kind, Level::ERROR, format_args!("runner stopped due to {fatal}"));
                options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                return Err(fatal);
            }
            Err(Fault::Unexpected(err)) => {
                command.options().log(
                    kind,
                    Level::WARN,
                    format_args!("unexpected fault on attempt {attempt}: {err:#}"),
                );
                CommandResult::error(UNEXPECTED_FAULT_MESSAGE).with_fault(err)
            }
        };
        timer.add_checkpoint("done working");
        timer.stop();

        let options = command.options();
        match result.level() {
            Severity::Ok => {
                options.counter.increment();
                options.log(kind, Level::DEBUG, "result OK");
                options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                return Ok(result);
            }
            Severity::Error => match options.error_strategy {
                ErrorStrategy::Omit => {
                    options.log(kind, Level::INFO, "omitting error");
                    options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                    return Ok(result);
                }
                ErrorStrategy::Restart => {
                    options.log(
                        kind,
                        Level::INFO,
                        format_args!("restarting process after attempt {attempt}"),
                    );
                    options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                }
                ErrorStrategy::Stop => {
                    options.log(
                        kind,
                        Level::INFO,
                        format_args!("process stopped with result {result}"),
                    );
                    options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                    return Ok(result);
                }
            },
            Severity::Critical => {
                options.log(
                    kind,
                    Level::ERROR,
                    format_args!("process critical error {result}"),
                );
                options.log(kind, Level::DEBUG, format_args!("timer: {timer}"));
                return Err(RunnerFatalError::new(result, attempt));
            }
        }
    }

    command.options().log(
        kind,
        Level::ERROR,
        format_args!("giving up after {MAX_ATTEMPTS} attempts"),
    );
    Ok(CommandResult::critical(CANNOT_RUN_MESSAGE).with_text(format!("command: {kind}")))
}
