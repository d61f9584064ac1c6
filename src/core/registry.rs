//! # Listener registry - type-keyed index of listeners.
//!
//! Maps an [`EventType`] to the bucket of listeners registered for exactly that type.
//!
//! ## Architecture
//! ```text
//! register::<E, L>(l)  ──► bucket[E].push(l)
//! register_all(s)      ──► s.subscriptions() ──► bucket[Ei].push(s) for each declared Ei
//! unregister(&l)       ──► strip l from every bucket ──► drop empty buckets
//! clear::<E>()         ──► remove bucket[E] (exact key only)
//! select(&event)       ──► read lock ──► buckets where event.is_a(key) ──► snapshot Vec
//! ```
//!
//! ## Rules
//! - Buckets never stay empty: a bucket emptied by `unregister` is removed at once.
//! - Registration is not idempotent: registering twice yields two deliveries.
//! - Identity is the address of the `Arc` a listener was registered with.
//! - Selection snapshots the matching listeners and releases the lock before any
//!   listener runs, so listeners may freely (un)register during dispatch.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::events::{Event, EventType};
use crate::listeners::{ErasedListener, EventListener, Subscribe, Subscriptions, Typed, identity_of};

type Bucket = Vec<Arc<dyn ErasedListener>>;

/// Thread-safe index from event type to listeners.
#[derive(Default)]
pub struct Registry {
    buckets: RwLock<HashMap<EventType, Bucket>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events that are instances of `E`.
    ///
    /// # Example
    /// ```
    /// use typebus::{ListenerError, ListenerFn, Registry, impl_event};
    ///
    /// #[derive(Clone)]
    /// struct Ping;
    /// impl_event!(Ping);
    ///
    /// let registry = Registry::new();
    /// let l = ListenerFn::arc("pong", |_: Ping| async { Ok::<_, ListenerError>(()) });
    /// registry.register::<Ping, _>(l.clone());
    /// registry.register::<Ping, _>(l.clone());
    /// assert_eq!(registry.listener_count(), 2);
    ///
    /// assert_eq!(registry.unregister(&l), 2);
    /// assert!(registry.is_empty());
    /// ```
    pub fn register<E, L>(&self, listener: Arc<L>)
    where
        E: Send + Sync + 'static,
        L: EventListener<E> + ?Sized,
    {
        self.insert(EventType::of::<E>(), Typed::<E, L>::erase(listener));
    }

    /// Registers a listener under every event type it declares.
    ///
    /// Returns the number of buckets the listener was added to; a listener that
    /// declares nothing is skipped.
    pub fn register_all<S>(&self, listener: Arc<S>) -> usize
    where
        S: Subscribe + ?Sized,
    {
        let mut subs = Subscriptions::new();
        listener.subscriptions(&mut subs);
        if subs.is_empty() {
            debug!("listener declared no event types; skipped");
            return 0;
        }

        let entries = subs.into_entries();
        let added = entries.len();
        for (ty, erased) in &entries {
            trace!(event = %ty, listener = erased.name(), "listener registered");
        }

        let mut buckets = self.write();
        for (ty, erased) in entries {
            buckets.entry(ty).or_default().push(erased);
        }
        added
    }

    /// Removes every registration of `listener`, across all buckets.
    ///
    /// Returns the number of removed entries (`0` if it was never registered).
    pub fn unregister<L: ?Sized>(&self, listener: &Arc<L>) -> usize {
        let identity = identity_of(listener);
        let mut removed = 0;

        let mut buckets = self.write();
        buckets.retain(|ty, bucket| {
            let before = bucket.len();
            bucket.retain(|l| l.identity() != identity);
            let stripped = before - bucket.len();
            if stripped > 0 {
                trace!(event = %ty, count = stripped, "listener unregistered");
            }
            removed += stripped;
            !bucket.is_empty()
        });
        removed
    }

    /// Removes the bucket for exactly `E`; sub- and supertype buckets are untouched.
    ///
    /// Returns the number of discarded listeners.
    pub fn clear<E: Send + Sync + 'static>(&self) -> usize {
        self.clear_type(EventType::of::<E>())
    }

    /// Removes the bucket keyed by `ty`. See [`clear`](Self::clear).
    pub fn clear_type(&self, ty: EventType) -> usize {
        let discarded = self.write().remove(&ty).map_or(0, |bucket| bucket.len());
        debug!(event = %ty, discarded, "bucket cleared");
        discarded
    }

    /// Returns `true` if a bucket exists for exactly `E`.
    pub fn contains<E: Send + Sync + 'static>(&self) -> bool {
        self.read().contains_key(&EventType::of::<E>())
    }

    /// Returns the keys of all non-empty buckets.
    pub fn types(&self) -> Vec<EventType> {
        self.read().keys().copied().collect()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Total number of registrations across all buckets.
    pub fn listener_count(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    /// Snapshot of every listener whose declared type `event` is an instance of.
    ///
    /// `Event::view` is called under the read lock.
    pub(crate) fn select(&self, event: &dyn Event) -> Vec<Arc<dyn ErasedListener>> {
        self.read()
            .iter()
            .filter(|(ty, _)| event.is_a(ty))
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect()
    }

    fn insert(&self, ty: EventType, listener: Arc<dyn ErasedListener>) {
        trace!(event = %ty, listener = listener.name(), "listener registered");
        self.write().entry(ty).or_default().push(listener);
    }

    // Only `Event::view` runs under the lock and it cannot leave the map half-updated,
    // so a poisoned lock still holds a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<EventType, Bucket>> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EventType, Bucket>> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot: Vec<(EventType, Bucket)> = self
            .read()
            .iter()
            .map(|(ty, bucket)| (*ty, bucket.clone()))
            .collect();

        let mut map = f.debug_map();
        for (ty, bucket) in &snapshot {
            map.entry(ty, &bucket.iter().map(|l| l.name()).collect::<Vec<_>>());
        }
        map.finish()
    }
}
