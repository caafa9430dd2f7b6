use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use jobrunner::command::{
    Command, CommandOptions, CommandResult, Fault, RunnerFatalError, WorkResult,
};

/// Shared log of which scripted commands ran, in order.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// One scripted outcome of `do_work()`.
#[derive(Debug, Clone)]
pub enum Step {
    /// `Ok(None)`.
    Nothing,
    Ok,
    Error,
    Critical,
    /// An unexpected (non-fatal) fault.
    Unexpected,
    /// Raise a `RunnerFatalError` with the given retry count.
    Fatal(u32),
    /// Sleep, then report `OK`.
    SleepOk(Duration),
    Panic,
}

/// A fake command that:
/// - replays a script of outcomes (the last step repeats once exhausted)
/// - counts its `do_work()` calls
/// - optionally appends its name to a shared journal.
pub struct ScriptedCommand {
    name: String,
    script: Vec<Step>,
    calls: Arc<AtomicUsize>,
    journal: Option<Journal>,
    work_count: u64,
    options: CommandOptions,
}

impl ScriptedCommand {
    pub fn new(name: &str, script: Vec<Step>, options: CommandOptions) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            journal: None,
            work_count: 1,
            options,
        }
    }

    pub fn always(name: &str, step: Step, options: CommandOptions) -> Self {
        Self::new(name, vec![step], options)
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Arc::clone(journal));
        self
    }

    pub fn with_work_count(mut self, work_count: u64) -> Self {
        self.work_count = work_count;
        self
    }

    /// Handle on the call count; keep it before boxing the command.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn boxed(self) -> Box<dyn Command> {
        Box::new(self)
    }
}

impl Command for ScriptedCommand {
    fn kind(&self) -> &'static str {
        "ScriptedCommand"
    }

    fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn work_count(&self) -> u64 {
        self.work_count
    }

    fn do_work(&mut self) -> WorkResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(self.name.clone());
        }

        let step = self
            .script
            .get(call)
            .or(self.script.last())
            .cloned()
            .unwrap_or(Step::Nothing);

        match step {
            Step::Nothing => Ok(None),
            Step::Ok => Ok(Some(CommandResult::ok().with_message(format!("{} ok", self.name)))),
            Step::Error => Ok(Some(CommandResult::error(format!("{} error", self.name)))),
            Step::Critical => Ok(Some(CommandResult::critical(format!("{} critical", self.name)))),
            Step::Unexpected => Err(Fault::Unexpected(anyhow!("{} blew up", self.name))),
            Step::Fatal(retry) => Err(Fault::Fatal(RunnerFatalError::new(
                CommandResult::critical(format!("{} fatal", self.name)),
                retry,
            ))),
            Step::SleepOk(duration) => {
                thread::sleep(duration);
                Ok(None)
            }
            Step::Panic => panic!("{} panicked", self.name),
        }
    }
}
