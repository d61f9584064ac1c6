//! # Event listener trait.
//!
//! Provides [`EventListener`] the capability invoked with events of one declared type.
//!
//! A listener declared for `E` receives every dispatched event that is an instance
//! of `E`: events of type `E` itself and events that declare `E` as a supertype.
//! The listener always sees the event *viewed as* `E`.
//!
//! ## Rules
//! - Returning `Err` or panicking never affects sibling listeners or registry state.
//! - In pooled delivery, a failing listener still counts as completed for the
//!   completion callback.
//! - A listener may implement `EventListener` for several types; register it once per type.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use typebus::{EventListener, ListenerError, impl_event};
//!
//! struct OrderPlaced { id: u64 }
//! impl_event!(OrderPlaced);
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl EventListener<OrderPlaced> for Audit {
//!     async fn on_event(&self, ev: &OrderPlaced) -> Result<(), ListenerError> {
//!         if ev.id == 0 {
//!             return Err(ListenerError::fail("order without id"));
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ListenerError;

/// Capability invoked with events of the declared type `E` (and its subtypes).
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Report recoverable failures with `Err`; panics are caught but discouraged.
/// - A listener that never returns stalls the completion callback of every
///   pooled dispatch it takes part in (there is no timeout).
#[async_trait]
pub trait EventListener<E>: Send + Sync + 'static
where
    E: Send + Sync + 'static,
{
    /// Handles one event.
    ///
    /// Called on the caller's task for immediate delivery, or from a worker task
    /// for pooled delivery.
    async fn on_event(&self, event: &E) -> Result<(), ListenerError>;

    /// Returns the listener name used in logs and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
