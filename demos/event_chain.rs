//! # Example: event_chain
//!
//! Demonstrates strictly ordered delivery with [`EventChain`].
//!
//! Each step has several slow listeners that run concurrently; the next step is
//! dispatched only once all of them finished.
//!
//! ## Flow
//! ```text
//! dispatch_chain([Fetch, Transform, Store])
//!     ├─► Fetch     ─► [fetch-a, fetch-b]     (concurrent) ─► latch
//!     ├─► Transform ─► [transform]                         ─► latch
//!     └─► Store     ─► [store, audit(Step)]   (concurrent) ─► Done
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=typebus=trace cargo run --example event_chain
//! ```

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;
use typebus::{Dispatcher, EventChain, EventListener, ListenerError, ListenerFn, impl_event};

#[derive(Clone, Debug)]
struct Step {
    name: &'static str,
}

#[derive(Clone, Debug)]
struct Fetch(Step);

#[derive(Clone, Debug)]
struct Transform(Step);

#[derive(Clone, Debug)]
struct Store(Step);

impl_event!(Step);
impl_event!(Fetch: Step => |e| &e.0);
impl_event!(Transform: Step => |e| &e.0);
impl_event!(Store: Step => |e| &e.0);

fn slow<E: Clone + Send + Sync + 'static>(name: &'static str, ms: u64) -> Arc<impl EventListener<E>> {
    ListenerFn::arc(name, move |_: E| async move {
        println!("[{name}] start");
        tokio::time::sleep(Duration::from_millis(ms)).await;
        println!("[{name}] done ({ms}ms)");
        Ok::<_, ListenerError>(())
    })
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Dispatcher::new()?;
    bus.register::<Fetch, _>(slow::<Fetch>("fetch-a", 120));
    bus.register::<Fetch, _>(slow::<Fetch>("fetch-b", 40));
    bus.register::<Transform, _>(slow::<Transform>("transform", 60));
    bus.register::<Store, _>(slow::<Store>("store", 30));
    bus.register::<Step, _>(ListenerFn::arc("audit", |step: Step| async move {
        println!("[audit] step {}", step.name);
        Ok::<_, ListenerError>(())
    }));

    let chain = EventChain::new()
        .with(Fetch(Step { name: "fetch" }))
        .with(Transform(Step { name: "transform" }))
        .with(Store(Step { name: "store" }));

    let progress = bus.dispatch_chain(chain);
    println!("[main] chain state: {:?}", progress.state());

    let last = progress.finished().await;
    println!("[main] chain finished: {last:?}");
    Ok(())
}
