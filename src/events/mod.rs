//! Dispatchable events: data model and chains.
//!
//! ## Contents
//! - [`Event`], [`EventType`] the event trait and the registry key
//! - [`impl_event!`](crate::impl_event) declares an event and its supertypes
//! - [`EventChain`] ordered queue consumed by the chain sequencer
//!
//! See `core/mod.rs` for how events flow through the dispatcher.

mod chain;
mod event;

pub use chain::EventChain;
pub use event::{Event, EventType};
