// src/exec/cancel.rs

//! Cancellation signal shared with background workers.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation signal handed to every background callable.
///
/// Nothing is interrupted forcibly: the worker checks
/// [`CancellationToken::is_cancelled`] or awaits
/// [`CancellationToken::cancelled`] and returns on its own.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once [`CancellationToken::cancel`] was called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
