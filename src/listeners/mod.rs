//! # Event listeners.
//!
//! This module provides the [`EventListener`] trait and its helpers.
//!
//! ## Architecture
//! ```text
//! register::<E, L>(Arc<L>) ─► Typed<E, L> ─► Arc<dyn ErasedListener> ─► Registry bucket E
//!                                                      │
//! dispatch(event) ─► selection ─► deliver(Arc<dyn Event>)
//!                                     └─► event.downcast_view::<E>() ─► L::on_event(&E)
//! ```
//!
//! ## Listener kinds
//! - **Typed listeners** implement [`EventListener<E>`] and are registered per type.
//! - **Closures** are wrapped with [`ListenerFn`].
//! - **Multi-interest listeners** implement [`Subscribe`] and declare all their types at once.

mod erased;
mod listener;
mod listener_fn;
mod subscribe;

pub(crate) use erased::{ErasedListener, Typed, identity_of};
pub use listener::EventListener;
pub use listener_fn::ListenerFn;
pub use subscribe::{Subscribe, Subscriptions};
