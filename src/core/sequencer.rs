//! # Event-chain sequencer.
//!
//! Delivers the events of an [`EventChain`] strictly one after another: the next
//! event is dispatched only once every listener of the previous one finished.
//!
//! ## Architecture
//! ```text
//! dispatch_chain(chain)
//!     └─► step: pop ──None──► Done
//!                └─Some(ev)─► Draining{ev} ─► submit_with_callback(ev, cont)
//!                                                   │
//!               latch released ◄────────────────────┘
//!                     └─► cont: Pending ─► executor.execute(step)   (trampoline, no recursion)
//!
//!               wait interrupted ─► cont dropped ─► ChainRun::drop ─► Halted{Some(ev)}
//!               scope cancelled before pop ─────► ChainRun::drop ─► Halted{None}
//! ```
//!
//! ## Rules
//! - The first step runs on the caller; every later step is a fresh executor task.
//! - The chain is owned by exactly one [`ChainRun`] at a time, which moves from
//!   continuation to continuation.
//! - A run that is dropped before reaching `Done` reports `Halted`.
//! - A run keeps the interrupt scope current when it was started; a later
//!   `interrupt()` does not reach it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::dispatcher::Shared;
use crate::events::{EventChain, EventType};

/// Observable progress of one chain dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainState {
    /// Accepted, or between two events: nothing is in flight.
    Pending {
        /// Events still queued.
        remaining: usize,
    },
    /// `event` is in flight; `remaining` events wait behind it.
    Draining { event: EventType, remaining: usize },
    /// Every event was delivered.
    Done,
    /// Interrupted. `event` is the event whose completion wait was cancelled, or
    /// `None` if the chain stopped between two events; `abandoned` events were
    /// never dispatched.
    Halted {
        event: Option<EventType>,
        abandoned: usize,
    },
}

impl ChainState {
    /// Returns `true` for `Done` and `Halted`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::Done | ChainState::Halted { .. })
    }
}

/// Handle returned by [`Dispatcher::dispatch_chain`](crate::Dispatcher::dispatch_chain).
///
/// Dropping it does not affect the chain.
#[derive(Clone, Debug)]
pub struct ChainProgress {
    rx: watch::Receiver<ChainState>,
}

impl ChainProgress {
    /// Current state.
    pub fn state(&self) -> ChainState {
        self.rx.borrow().clone()
    }

    /// Waits for the chain to reach `Done` or `Halted` and returns that state.
    pub async fn finished(&self) -> ChainState {
        let mut rx = self.rx.clone();
        // A closed channel still holds the terminal state published on drop.
        let _ = rx.wait_for(ChainState::is_terminal).await;
        let state = rx.borrow().clone();
        state
    }
}

/// Ownership token of an in-flight chain.
struct ChainRun {
    chain: EventChain,
    current: Option<EventType>,
    state: watch::Sender<ChainState>,
    scope: CancellationToken,
}

impl ChainRun {
    fn publish(&self, state: ChainState) {
        self.state.send_replace(state);
    }
}

impl Drop for ChainRun {
    fn drop(&mut self) {
        if self.state.borrow().is_terminal() {
            return;
        }
        let abandoned = self.chain.len();
        debug!(
            event = ?self.current,
            abandoned,
            "event chain halted"
        );
        self.publish(ChainState::Halted {
            event: self.current,
            abandoned,
        });
    }
}

pub(crate) fn start(shared: Arc<Shared>, chain: EventChain) -> ChainProgress {
    let (tx, rx) = watch::channel(ChainState::Pending {
        remaining: chain.len(),
    });
    trace!(events = chain.len(), "event chain accepted");

    let scope = shared.scope();
    step(
        shared,
        ChainRun {
            chain,
            current: None,
            state: tx,
            scope,
        },
    );
    ChainProgress { rx }
}

/// Dispatches the head of the chain; its completion schedules the next step.
fn step(shared: Arc<Shared>, mut run: ChainRun) {
    if run.scope.is_cancelled() && !run.chain.is_empty() {
        // Interrupted between events; drop reports the rest as abandoned.
        run.current = None;
        return;
    }
    let Some(event) = run.chain.pop() else {
        trace!("event chain drained");
        run.publish(ChainState::Done);
        return;
    };

    let ty = event.event_type();
    run.current = Some(ty);
    run.publish(ChainState::Draining {
        event: ty,
        remaining: run.chain.len(),
    });

    let next = Arc::clone(&shared);
    let scope = run.scope.clone();
    shared.submit_with_callback(
        event,
        scope,
        Box::new(move || {
            if !run.chain.is_empty() {
                run.publish(ChainState::Pending {
                    remaining: run.chain.len(),
                });
            }
            let executor = Arc::clone(&next.executor);
            executor.execute(Box::pin(async move { step(next, run) }));
        }),
    );
}
