//! # Ordered queue of events delivered one at a time.
//!
//! An [`EventChain`] is built by the caller and handed to
//! [`Dispatcher::dispatch_chain`](crate::Dispatcher::dispatch_chain), which takes
//! ownership and drains it head first. Each event is dispatched only after every
//! listener of the previous event has finished.
//!
//! ## Example
//! ```rust
//! use typebus::{EventChain, impl_event};
//!
//! struct Reserve;
//! struct Charge;
//! impl_event!(Reserve);
//! impl_event!(Charge);
//!
//! let mut chain = EventChain::new().with(Reserve);
//! chain.push(Charge);
//! assert_eq!(chain.len(), 2);
//! assert!(chain.pop().is_some());
//! assert!(chain.pop().is_some());
//! assert!(chain.pop().is_none());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;

/// Single-consumer FIFO of events.
#[derive(Default)]
pub struct EventChain {
    events: VecDeque<Arc<dyn Event>>,
}

impl EventChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event at the tail.
    pub fn push<E: Event>(&mut self, event: E) {
        self.events.push_back(Arc::new(event));
    }

    /// Appends an already shared event at the tail.
    pub fn push_shared(&mut self, event: Arc<dyn Event>) {
        self.events.push_back(event);
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with<E: Event>(mut self, event: E) -> Self {
        self.push(event);
        self
    }

    /// Removes and returns the head, or `None` once the chain is exhausted.
    pub fn pop(&mut self) -> Option<Arc<dyn Event>> {
        self.events.pop_front()
    }

    /// Number of events still queued.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Debug for EventChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.events.iter().map(|e| e.event_type()))
            .finish()
    }
}

impl FromIterator<Arc<dyn Event>> for EventChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Event>>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
