// src/counter.rs

//! Shared count of successfully completed units of work.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle to a work counter.
///
/// Cloning the handle shares the underlying count, so one counter is usually
/// created per command tree and handed to every command in it through
/// [`crate::command::CommandOptions`]. Parallel workers increment it
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct WorkCounter {
    count: Arc<AtomicU64>,
}

impl WorkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed unit of work.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Whether both handles point at the same count.
    pub fn shares_with(&self, other: &WorkCounter) -> bool {
        Arc::ptr_eq(&self.count, &other.count)
    }
}
