//! # Dispatcher: selects listeners by type and delivers events.
//!
//! The [`Dispatcher`] owns a [`Registry`], an [`Executor`] and the cancellation scope
//! used to interrupt completion waits. It is cheap to clone; clones share all state.
//!
//! ## Delivery modes
//! ```text
//! dispatch(ev).await                    ── caller's task ──► L1 → L2 → ... → Ln  (sequential)
//!                                                           └─► Result<attempted, DispatchError>
//!
//! dispatch_async(ev)                    ──► executor: [L1] [L2] ... [Ln]        (returns at once)
//!
//! dispatch_with_callback(ev, done)      ──► executor: [L1+guard] ... [Ln+guard]
//!                                       ──► executor: [waiter: latch.wait() ─► done()]
//!                                                          └─ interrupted ─► warn!, done dropped
//! ```
//!
//! ## Rules
//! - Selection is computed fresh on every call from a registry snapshot.
//! - Listener failures (errors and panics) never stop sibling listeners.
//! - Pooled modes never fail synchronously and never block the caller.
//! - The executor is never shut down by the dispatcher.
//! - `interrupt()` cancels the current scope and installs a fresh one: it reaches the
//!   waits pending at that moment, never later ones.
//!
//! ## Example
//! ```rust
//! use typebus::{Dispatcher, ListenerError, ListenerFn, impl_event};
//!
//! #[derive(Clone, Debug)]
//! struct Greeting(String);
//! impl_event!(Greeting);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Dispatcher::new()?;
//!     bus.register::<Greeting, _>(ListenerFn::arc("printer", |g: Greeting| async move {
//!         println!("hello, {}", g.0);
//!         Ok::<_, ListenerError>(())
//!     }));
//!
//!     let attempted = bus.dispatch(Greeting("world".into())).await?;
//!     assert_eq!(attempted, 1);
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::builder::DispatcherBuilder;
use crate::core::config::Config;
use crate::core::executor::{Executor, TokioExecutor};
use crate::core::latch::CompletionLatch;
use crate::core::registry::Registry;
use crate::core::runner;
use crate::core::sequencer::{self, ChainProgress};
use crate::error::{DispatchError, RuntimeError};
use crate::events::{Event, EventChain, EventType};
use crate::listeners::{ErasedListener, EventListener, Subscribe};

/// Callback invoked once all listeners of a pooled dispatch finished.
pub(crate) type Callback = Box<dyn FnOnce() + Send + 'static>;

/// State shared by all clones of a dispatcher.
pub(crate) struct Shared {
    pub(crate) registry: Registry,
    pub(crate) executor: Arc<dyn Executor>,
    /// Optional cap on concurrently running listener tasks.
    limiter: Option<Arc<Semaphore>>,
    /// Scope of the completion waits started since the last interrupt.
    scope: Mutex<CancellationToken>,
    interrupted: AtomicBool,
}

/// Type-based event dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) shared: Arc<Shared>,
}

impl Dispatcher {
    /// Creates a dispatcher with default config on the current tokio runtime.
    ///
    /// Fails with [`RuntimeError::NoRuntime`] outside a runtime.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::builder(Config::default()).build()
    }

    /// Creates a dispatcher with default config on the given executor.
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self::from_parts(Config::default(), executor)
    }

    /// Returns a builder for custom configuration.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, executor: Arc<dyn Executor>) -> Self {
        let limiter = cfg.concurrency_limit().map(Semaphore::new).map(Arc::new);
        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(),
                executor,
                limiter,
                scope: Mutex::new(CancellationToken::new()),
                interrupted: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn default_executor() -> Result<Arc<dyn Executor>, RuntimeError> {
        Ok(Arc::new(TokioExecutor::current()?))
    }

    /// Returns the listener registry.
    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    /// Registers `listener` for events that are instances of `E`.
    ///
    /// See [`Registry::register`].
    pub fn register<E, L>(&self, listener: Arc<L>)
    where
        E: Send + Sync + 'static,
        L: EventListener<E> + ?Sized,
    {
        self.shared.registry.register::<E, L>(listener);
    }

    /// Registers a listener under every event type it declares.
    ///
    /// See [`Registry::register_all`].
    pub fn register_all<S>(&self, listener: Arc<S>) -> usize
    where
        S: Subscribe + ?Sized,
    {
        self.shared.registry.register_all(listener)
    }

    /// Removes every registration of `listener`.
    ///
    /// See [`Registry::unregister`].
    pub fn unregister<L: ?Sized>(&self, listener: &Arc<L>) -> usize {
        self.shared.registry.unregister(listener)
    }

    /// Removes the bucket for exactly `E`.
    ///
    /// See [`Registry::clear`].
    pub fn clear<E: Send + Sync + 'static>(&self) -> usize {
        self.shared.registry.clear::<E>()
    }

    /// Removes the bucket keyed by `ty`.
    pub fn clear_type(&self, ty: EventType) -> usize {
        self.shared.registry.clear_type(ty)
    }

    /// Delivers `event` to every matching listener on the caller's task, one after another.
    ///
    /// Each listener is attempted even if earlier ones failed. Returns the number of
    /// listeners attempted, or [`DispatchError::ListenersFailed`] carrying every failure.
    /// Not subject to [`Config::max_concurrent`].
    pub async fn dispatch<E: Event>(&self, event: E) -> Result<usize, DispatchError> {
        let event: Arc<dyn Event> = Arc::new(event);
        let selected = self.shared.registry.select(event.as_ref());
        trace!(event = %event.event_type(), listeners = selected.len(), "dispatching inline");

        let mut failures = Vec::new();
        for listener in &selected {
            if let Err(failure) = runner::deliver(listener, Arc::clone(&event)).await {
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            Ok(selected.len())
        } else {
            Err(DispatchError::ListenersFailed {
                event: event.event_type().name(),
                attempted: selected.len(),
                failures,
            })
        }
    }

    /// Submits one executor task per matching listener and returns immediately.
    ///
    /// Returns the number of submitted tasks. There is no completion signal;
    /// failures are logged inside the tasks.
    pub fn dispatch_async<E: Event>(&self, event: E) -> usize {
        let event: Arc<dyn Event> = Arc::new(event);
        let selected = self.shared.registry.select(event.as_ref());
        trace!(event = %event.event_type(), listeners = selected.len(), "dispatching detached");

        for listener in &selected {
            let task = self.shared.listener_task(Arc::clone(listener), Arc::clone(&event));
            self.shared.executor.execute(task);
        }
        selected.len()
    }

    /// Submits one executor task per matching listener, then invokes `on_complete`
    /// once all of them finished (successfully or not).
    ///
    /// With no matching listener the callback still fires. The callback runs on
    /// the executor, never on the caller's task; it is dropped without being called
    /// if the wait is [interrupted](Self::interrupt). Returns the number of listener
    /// tasks submitted.
    pub fn dispatch_with_callback<E, F>(&self, event: E, on_complete: F) -> usize
    where
        E: Event,
        F: FnOnce() + Send + 'static,
    {
        self.shared
            .submit_with_callback(Arc::new(event), self.shared.scope(), Box::new(on_complete))
    }

    /// Delivers the events of `chain` strictly in order.
    ///
    /// Each event goes through [`dispatch_with_callback`](Self::dispatch_with_callback);
    /// the next one is dispatched only from the previous one's callback. Returns a
    /// handle to observe progress; dropping it does not stop the chain.
    pub fn dispatch_chain(&self, chain: EventChain) -> ChainProgress {
        sequencer::start(Arc::clone(&self.shared), chain)
    }

    /// Interrupts every completion wait pending right now.
    ///
    /// Those waiters log a warning and drop their callbacks; chains started before
    /// the call halt. Listener tasks already submitted still run. Dispatches and
    /// chains started afterwards are unaffected.
    pub fn interrupt(&self) {
        let pending = {
            let mut scope = self
                .shared
                .scope
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *scope, CancellationToken::new())
        };
        debug!("dispatcher interrupted");
        self.shared.interrupted.store(true, Ordering::Release);
        pending.cancel();
    }

    /// Returns `true` if [`interrupt`](Self::interrupt) was called at least once.
    pub fn is_interrupted(&self) -> bool {
        self.shared.interrupted.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.shared.registry)
            .field("limited", &self.shared.limiter.is_some())
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

impl Shared {
    /// Token cancelled by the next [`Dispatcher::interrupt`].
    pub(crate) fn scope(&self) -> CancellationToken {
        self.scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mode-3 core shared by `dispatch_with_callback` and the chain sequencer.
    ///
    /// The wait is abandoned when `scope` is cancelled.
    pub(crate) fn submit_with_callback(
        &self,
        event: Arc<dyn Event>,
        scope: CancellationToken,
        on_complete: Callback,
    ) -> usize {
        let selected = self.registry.select(event.as_ref());
        let ty = event.event_type();
        trace!(event = %ty, listeners = selected.len(), "dispatching with callback");

        let latch = CompletionLatch::new(selected.len());
        for listener in &selected {
            let guard = latch.guard();
            let task = self.listener_task(Arc::clone(listener), Arc::clone(&event));
            self.executor.execute(Box::pin(async move {
                let _guard = guard;
                task.await;
            }));
        }

        self.executor.execute(Box::pin(async move {
            tokio::select! {
                biased;
                () = scope.cancelled() => {
                    warn!(
                        event = %ty,
                        pending = latch.remaining(),
                        "completion wait interrupted; callback dropped"
                    );
                }
                () = latch.wait() => on_complete(),
            }
        }));
        selected.len()
    }

    /// Wraps one listener invocation for the executor, honoring the concurrency cap.
    fn listener_task(
        &self,
        listener: Arc<dyn ErasedListener>,
        event: Arc<dyn Event>,
    ) -> BoxFuture<'static, ()> {
        let limiter = self.limiter.clone();
        Box::pin(async move {
            // Never closed, so acquisition only fails if the limiter is gone.
            let _permit = match limiter {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            // Already logged by the runner.
            let _ = runner::deliver(&listener, event).await;
        })
    }
}
