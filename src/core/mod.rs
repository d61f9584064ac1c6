//! Dispatch core: registry, delivery modes and chain sequencing.
//!
//! The public entry point is [`Dispatcher`], which owns the listener
//! [`Registry`] and submits pooled work to an [`Executor`].
//!
//! Internal modules:
//! - [`registry`]: type-keyed listener buckets and supertype selection;
//! - [`dispatcher`]: the three delivery modes and interruption;
//! - [`sequencer`]: ordered event-chain delivery over the callback mode;
//! - [`runner`]: one isolated listener invocation (errors and panics contained);
//! - [`latch`]: completion counting for the callback mode;
//! - [`executor`]: the pool capability and its tokio default.

mod builder;
mod config;
mod dispatcher;
mod executor;
mod latch;
mod registry;
mod runner;
mod sequencer;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use executor::{Executor, TokioExecutor};
pub use registry::Registry;
pub use sequencer::{ChainProgress, ChainState};
