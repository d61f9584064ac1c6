//! # Completion counter for callback delivery.
//!
//! [`CompletionLatch`] starts at the number of submitted listener tasks; every task
//! holds a [`LatchGuard`] that counts down when the task ends. The guard counts down
//! on drop, so a task that errors, panics, or is dropped unpolled still releases it.
//!
//! ```text
//! latch(3) ── guard ─► task 1 ─┐
//!          ── guard ─► task 2 ─┼─► count_down ×3 ─► wait() resolves ─► callback
//!          ── guard ─► task 3 ─┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Count-down latch released once every guard is gone.
#[derive(Debug)]
pub(crate) struct CompletionLatch {
    remaining: AtomicUsize,
    notify: Notify,
}

impl CompletionLatch {
    pub(crate) fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        })
    }

    /// Creates a guard that counts down once when dropped.
    pub(crate) fn guard(self: &Arc<Self>) -> LatchGuard {
        LatchGuard {
            latch: Arc::clone(self),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    fn count_down(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }

    /// Resolves once the count reaches zero (immediately if it already is).
    pub(crate) async fn wait(&self) {
        loop {
            // Registered before the check so a concurrent notify_waiters is not missed.
            let notified = self.notify.notified();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Counts the latch down exactly once, on drop.
#[derive(Debug)]
pub(crate) struct LatchGuard {
    latch: Arc<CompletionLatch>,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
