//! # Worker pool capability.
//!
//! [`Executor`] is the injection point for the pool that runs pooled deliveries,
//! completion waits and chain continuations. The dispatcher only ever submits
//! work to it; it never resizes or shuts it down.
//!
//! [`TokioExecutor`] (the default) spawns every task on a tokio runtime, which
//! gives unbounded concurrency like a cached thread pool.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use futures::future::BoxFuture;
//! use typebus::{Dispatcher, Executor};
//!
//! struct Counting {
//!     handle: tokio::runtime::Handle,
//!     submitted: AtomicUsize,
//! }
//!
//! impl Executor for Counting {
//!     fn execute(&self, task: BoxFuture<'static, ()>) {
//!         self.submitted.fetch_add(1, Ordering::Relaxed);
//!         self.handle.spawn(task);
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let exec = Arc::new(Counting { handle: tokio::runtime::Handle::current(), submitted: AtomicUsize::new(0) });
//! let bus = Dispatcher::with_executor(exec.clone());
//! # let _ = bus;
//! # }
//! ```

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::error::RuntimeError;

/// Task-execution capability used for pooled delivery.
///
/// ### Implementation requirements
/// - `execute` must not block and must not fail; the task must eventually be polled
///   to completion.
/// - Tasks may be polled on any thread.
pub trait Executor: Send + Sync + 'static {
    /// Submits a task for execution.
    fn execute(&self, task: BoxFuture<'static, ()>);
}

/// Default executor: spawns tasks on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Uses the given runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running in.
    ///
    /// Fails with [`RuntimeError::NoRuntime`] outside a tokio runtime.
    pub fn current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| RuntimeError::NoRuntime)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: BoxFuture<'static, ()>) {
        // Detached: completion is observed through the task itself.
        drop(self.handle.spawn(task));
    }
}
