//! # typebus
//!
//! **Typebus** is an in-process, type-based event dispatcher for Rust.
//!
//! Producers emit typed events; listeners registered for the event's type, or for
//! any type the event can be viewed as, are invoked with it. The crate is a building
//! block for decoupling components inside one process: it has no persistence, no
//! acknowledgments and no cross-process transport.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producer                            listeners
//!     │                     ┌──────────────────────────────────────┐
//!     │ dispatch*(event)    │ Registry                             │
//!     ▼                     │   EventType(Base)    ─► [A, C]       │
//! ┌────────────┐  select    │   EventType(Derived) ─► [B]          │
//! │ Dispatcher │──────────► │   EventType(Other)   ─► [D]          │
//! └─────┬──────┘  is_a(key) └──────────────────────────────────────┘
//!       │
//!       ├─ dispatch(ev).await            ─► A, C, B inline, in order; errors collected
//!       ├─ dispatch_async(ev)            ─► Executor: [A] [C] [B]  (fire-and-forget)
//!       ├─ dispatch_with_callback(ev,f)  ─► Executor: [A] [C] [B] ─► latch ─► f()
//!       └─ dispatch_chain([e1, e2, ..])  ─► e1 via callback mode ─► e2 ─► ... ─► Done
//! ```
//!
//! ### Selection
//! An event of runtime type `Derived` (declared with `impl_event!(Derived: Base => ...)`)
//! is an instance of `Derived` and `Base`, so the listeners of both buckets above
//! receive it; a `Base` event only reaches `[A, C]`.
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                         |
//! |------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Events**       | Typed events with declared supertypes.                       | [`Event`], [`EventType`], [`impl_event!`]  |
//! | **Listeners**    | Typed async listeners, closures, multi-interest listeners.   | [`EventListener`], [`ListenerFn`], [`Subscribe`] |
//! | **Dispatch**     | Immediate, fire-and-forget and callback delivery.            | [`Dispatcher`], [`Registry`]               |
//! | **Chains**       | Strictly ordered delivery of a queue of events.              | [`EventChain`], [`ChainProgress`]          |
//! | **Execution**    | Injectable worker pool.                                      | [`Executor`], [`TokioExecutor`]            |
//! | **Errors**       | Typed listener and dispatch errors.                          | [`ListenerError`], [`DispatchError`]       |
//! | **Configuration**| Concurrency cap for pooled delivery.                         | [`Config`]                                 |
//!
//! ## Example
//! ```rust
//! use typebus::{Config, Dispatcher, EventChain, ChainState, ListenerError, ListenerFn, impl_event};
//!
//! #[derive(Clone, Debug)]
//! struct UserEvent { id: u64 }
//!
//! #[derive(Clone, Debug)]
//! struct UserCreated { user: UserEvent, email: String }
//!
//! impl_event!(UserEvent);
//! impl_event!(UserCreated: UserEvent => |e| &e.user);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Dispatcher::builder(Config::default()).build()?;
//!
//!     // Receives every UserEvent, including UserCreated.
//!     bus.register::<UserEvent, _>(ListenerFn::arc("audit", |e: UserEvent| async move {
//!         println!("audit user {}", e.id);
//!         Ok::<_, ListenerError>(())
//!     }));
//!     bus.register::<UserCreated, _>(ListenerFn::arc("welcome", |e: UserCreated| async move {
//!         println!("welcome {}", e.email);
//!         Ok::<_, ListenerError>(())
//!     }));
//!
//!     let created = UserCreated { user: UserEvent { id: 1 }, email: "a@b.c".into() };
//!     assert_eq!(bus.dispatch(created.clone()).await?, 2);
//!
//!     let chain = EventChain::new().with(created).with(UserEvent { id: 2 });
//!     assert_eq!(bus.dispatch_chain(chain).finished().await, ChainState::Done);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{
    ChainProgress, ChainState, Config, Dispatcher, DispatcherBuilder, Executor, Registry,
    TokioExecutor,
};
pub use error::{DispatchError, FailureCause, ListenerError, ListenerFailure, RuntimeError};
pub use events::{Event, EventChain, EventType};
pub use listeners::{EventListener, ListenerFn, Subscribe, Subscriptions};
