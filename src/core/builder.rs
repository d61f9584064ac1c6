use std::sync::Arc;

use tracing::debug;

use super::{config::Config, dispatcher::Dispatcher, executor::Executor};
use crate::{error::RuntimeError, listeners::Subscribe};

/// Builder for constructing a Dispatcher with optional features.
pub struct DispatcherBuilder {
    cfg: Config,
    executor: Option<Arc<dyn Executor>>,
    listeners: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            executor: None,
            listeners: Vec::new(),
        }
    }

    /// Uses `executor` for pooled delivery instead of the ambient tokio runtime.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets listeners registered at build time.
    ///
    /// Each one is registered under every event type it declares through
    /// [`Subscribe::subscriptions`]; listeners declaring nothing are skipped.
    pub fn with_listeners(mut self, listeners: Vec<Arc<dyn Subscribe>>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Builds and returns the Dispatcher instance.
    ///
    /// Without an explicit executor, the current tokio runtime is captured;
    /// this fails with [`RuntimeError::NoRuntime`] outside a runtime.
    pub fn build(self) -> Result<Dispatcher, RuntimeError> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Dispatcher::default_executor()?,
        };
        let max_concurrent = self.cfg.max_concurrent;
        let dispatcher = Dispatcher::from_parts(self.cfg, executor);

        let mut registrations = 0;
        for listener in self.listeners {
            registrations += dispatcher.register_all(listener);
        }
        debug!(
            registrations,
            max_concurrent,
            "dispatcher built"
        );
        Ok(dispatcher)
    }
}
