//! Type-erased listener handles stored in the registry.
//!
//! The registry holds listeners of many declared types in one index, so each
//! typed [`EventListener<E>`] is wrapped in a [`Typed`] adapter that projects a
//! dispatched `dyn Event` onto `E` before calling it.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::ListenerError;
use crate::events::{Event, EventType};
use crate::listeners::EventListener;

/// Object-safe face of a registered listener.
pub(crate) trait ErasedListener: Send + Sync {
    /// Listener name for logs and failure reports.
    fn name(&self) -> &str;

    /// Address of the shared allocation the listener was registered with.
    fn identity(&self) -> usize;

    /// Creates the future delivering `event` to the listener.
    ///
    /// No listener code runs until the returned future is polled.
    fn deliver(&self, event: Arc<dyn Event>) -> BoxFuture<'static, Result<(), ListenerError>>;
}

/// Adapter from `EventListener<E>` to [`ErasedListener`].
pub(crate) struct Typed<E, L: ?Sized> {
    listener: Arc<L>,
    _event: PhantomData<fn(&E)>,
}

impl<E, L> Typed<E, L>
where
    E: Send + Sync + 'static,
    L: EventListener<E> + ?Sized,
{
    pub(crate) fn erase(listener: Arc<L>) -> Arc<dyn ErasedListener> {
        Arc::new(Self {
            listener,
            _event: PhantomData,
        })
    }
}

impl<E, L> ErasedListener for Typed<E, L>
where
    E: Send + Sync + 'static,
    L: EventListener<E> + ?Sized,
{
    fn name(&self) -> &str {
        EventListener::<E>::name(&*self.listener)
    }

    fn identity(&self) -> usize {
        identity_of(&self.listener)
    }

    fn deliver(&self, event: Arc<dyn Event>) -> BoxFuture<'static, Result<(), ListenerError>> {
        let listener = Arc::clone(&self.listener);
        Box::pin(async move {
            let Some(view) = event.downcast_view::<E>() else {
                return Err(ListenerError::Incompatible {
                    expected: EventType::of::<E>().name(),
                    actual: event.event_type().name(),
                });
            };
            EventListener::<E>::on_event(&*listener, view).await
        })
    }
}

/// Thin address of an `Arc`, used as listener identity.
pub(crate) fn identity_of<L: ?Sized>(listener: &Arc<L>) -> usize {
    Arc::as_ptr(listener).cast::<()>() as usize
}
