//! # Listeners that declare their own interests.
//!
//! [`Subscribe`] lets one listener declare every event type it wants, so that a
//! single [`Registry::register_all`](crate::Registry::register_all) call (or the
//! builder's `with_listeners`) files it under each of them.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use typebus::{EventListener, ListenerError, Subscribe, Subscriptions, impl_event};
//!
//! struct Placed;
//! struct Cancelled;
//! impl_event!(Placed);
//! impl_event!(Cancelled);
//!
//! struct Ledger;
//!
//! #[async_trait]
//! impl EventListener<Placed> for Ledger {
//!     async fn on_event(&self, _: &Placed) -> Result<(), ListenerError> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl EventListener<Cancelled> for Ledger {
//!     async fn on_event(&self, _: &Cancelled) -> Result<(), ListenerError> { Ok(()) }
//! }
//!
//! impl Subscribe for Ledger {
//!     fn subscriptions(self: Arc<Self>, subs: &mut Subscriptions) {
//!         subs.listen::<Placed, _>(Arc::clone(&self))
//!             .listen::<Cancelled, _>(self);
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::events::EventType;
use crate::listeners::EventListener;
use crate::listeners::erased::{ErasedListener, Typed};

/// A listener that declares the event types it listens to.
pub trait Subscribe: Send + Sync + 'static {
    /// Adds one entry per declared event type.
    ///
    /// Declaring nothing is allowed: registration then does nothing.
    fn subscriptions(self: Arc<Self>, subs: &mut Subscriptions);
}

/// Collected `(event type, listener)` declarations.
#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<(EventType, Arc<dyn ErasedListener>)>,
}

impl Subscriptions {
    /// Creates an empty declaration set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares interest in `E`.
    pub fn listen<E, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        E: Send + Sync + 'static,
        L: EventListener<E> + ?Sized,
    {
        self.entries
            .push((EventType::of::<E>(), Typed::<E, L>::erase(listener)));
        self
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared event types, in declaration order.
    pub fn types(&self) -> Vec<EventType> {
        self.entries.iter().map(|(ty, _)| *ty).collect()
    }

    pub(crate) fn into_entries(self) -> Vec<(EventType, Arc<dyn ErasedListener>)> {
        self.entries
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(ty, l)| (ty, l.name())))
            .finish()
    }
}
