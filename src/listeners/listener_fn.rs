//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(E) -> Fut`, producing a fresh future per
//! delivered event. The closure receives an owned clone of the event view, so the
//! returned future can be `'static` and move freely between worker threads.
//!
//! ## Example
//! ```rust
//! use typebus::{ListenerError, ListenerFn, impl_event};
//!
//! #[derive(Clone)]
//! struct Tick(u64);
//! impl_event!(Tick);
//!
//! let l = ListenerFn::arc("ticker", |t: Tick| async move {
//!     if t.0 == 0 {
//!         return Err(ListenerError::fail("zero tick"));
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(typebus::EventListener::<Tick>::name(&*l), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::listeners::EventListener;

/// Function-backed listener implementation.
///
/// Wraps a closure that *creates* a new future per event.
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately register it.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> EventListener<E> for ListenerFn<F>
where
    E: Clone + Send + Sync + 'static,
    F: Fn(E) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    async fn on_event(&self, event: &E) -> Result<(), ListenerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for ListenerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
