// src/timer.rs

//! Stopwatch with named checkpoints, used for diagnostics only.

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Timer {
    started: Instant,
    checkpoints: Vec<(String, Duration)>,
    stopped: Option<Duration>,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            checkpoints: Vec::new(),
            stopped: None,
        }
    }

    /// Record the time elapsed since start under `label`.
    pub fn add_checkpoint(&mut self, label: impl Into<String>) {
        let at = self.started.elapsed();
        self.checkpoints.push((label.into(), at));
    }

    /// Freeze the total elapsed time. Later calls keep the first value.
    pub fn stop(&mut self) -> Duration {
        *self.stopped.get_or_insert_with(|| self.started.elapsed())
    }

    /// Total time: frozen value once stopped, live value otherwise.
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| self.started.elapsed())
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total {:?}", self.elapsed())?;
        for (label, at) in &self.checkpoints {
            write!(f, ", {label} @ {at:?}")?;
        }
        Ok(())
    }
}
