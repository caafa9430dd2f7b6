// src/command/thread.rs

//! Run a callable on a background thread with an optional timeout.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::Level;

use crate::command::{Command, CommandOptions, CommandResult, WorkResult};
use crate::exec::CancellationToken;

pub const TIMEOUT_MESSAGE: &str = "timeout";

/// Callable run by [`ThreadCommand`]. It receives a token that is cancelled
/// once the command stops waiting for it.
pub type BackgroundTask = Arc<dyn Fn(&CancellationToken) + Send + Sync>;

/// Runs a callable on a fresh worker thread for every `process()` call.
///
/// The command only knows whether the callable finished in time: it reports
/// `OK` when it did and `ERROR("timeout")` when it did not. A timed-out worker
/// is signalled through its [`CancellationToken`] and left detached; a
/// callable that never checks the token keeps its thread alive.
pub struct ThreadCommand {
    task: BackgroundTask,
    timeout: Option<Duration>,
    options: CommandOptions,
}

impl ThreadCommand {
    pub fn new<F>(task: F, timeout: Option<Duration>, options: CommandOptions) -> Self
    where
        F: Fn(&CancellationToken) + Send + Sync + 'static,
    {
        Self {
            task: Arc::new(task),
            timeout,
            options,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Command for ThreadCommand {
    fn kind(&self) -> &'static str {
        "ThreadCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        1
    }

    fn do_work(&mut self) -> WorkResult {
        let token = CancellationToken::new();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let task = Arc::clone(&self.task);
        let worker_token = token.clone();
        let handle = thread::Builder::new()
            .name("background-command".to_string())
            .spawn(move || {
                task(&worker_token);
                // The receiver is gone if the command already timed out.
                let _ = done_tx.send(());
            })
            .context("spawning background worker")?;

        // A disconnected channel means the worker ended without signalling,
        // i.e. it panicked; it still finished in time.
        let finished = match self.timeout {
            Some(timeout) => !matches!(
                done_rx.recv_timeout(timeout),
                Err(RecvTimeoutError::Timeout)
            ),
            None => {
                let _ = done_rx.recv();
                true
            }
        };

        if !finished {
            token.cancel();
            self.options.log(
                self.kind(),
                Level::WARN,
                format_args!(
                    "worker did not finish within {:?}; cancelling and detaching it",
                    self.timeout
                ),
            );
            return Ok(Some(CommandResult::error(TIMEOUT_MESSAGE)));
        }

        if handle.join().is_err() {
            self.options.log(self.kind(), Level::WARN, "background callable panicked");
        }
        Ok(Some(CommandResult::ok()))
    }
}
