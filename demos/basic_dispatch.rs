//! # Example: basic_dispatch
//!
//! Demonstrates type-based selection and the three delivery modes.
//!
//! Shows how to:
//! - Declare events with a supertype via [`impl_event!`].
//! - Register closure listeners ([`ListenerFn`]) and a multi-interest listener ([`Subscribe`]).
//! - Deliver inline, fire-and-forget, and with a completion callback.
//!
//! ## Flow
//! ```text
//! OrderPlaced ──view──► OrderEvent
//!
//! dispatch(OrderPlaced)               ─► audit + billing inline
//! dispatch_async(OrderEvent)          ─► audit on the pool
//! dispatch_with_callback(OrderPlaced) ─► audit + billing on the pool ─► "all done"
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=typebus=trace cargo run --example basic_dispatch
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use typebus::{
    Config, Dispatcher, EventListener, ListenerError, ListenerFn, Subscribe, Subscriptions,
    impl_event,
};

#[derive(Clone, Debug)]
struct OrderEvent {
    id: u64,
}

#[derive(Clone, Debug)]
struct OrderPlaced {
    order: OrderEvent,
    total_cents: u64,
}

#[derive(Clone, Debug)]
struct Heartbeat;

impl_event!(OrderEvent);
impl_event!(OrderPlaced: OrderEvent => |e| &e.order);
impl_event!(Heartbeat);

/// Bills placed orders and watches heartbeats.
struct Billing;

#[async_trait]
impl EventListener<OrderPlaced> for Billing {
    async fn on_event(&self, ev: &OrderPlaced) -> Result<(), ListenerError> {
        if ev.total_cents == 0 {
            return Err(ListenerError::fail("refusing to bill an empty order"));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[billing] order {} billed {} cents", ev.order.id, ev.total_cents);
        Ok(())
    }

    fn name(&self) -> &str {
        "billing"
    }
}

#[async_trait]
impl EventListener<Heartbeat> for Billing {
    async fn on_event(&self, _: &Heartbeat) -> Result<(), ListenerError> {
        println!("[billing] alive");
        Ok(())
    }

    fn name(&self) -> &str {
        "billing"
    }
}

impl Subscribe for Billing {
    fn subscriptions(self: Arc<Self>, subs: &mut Subscriptions) {
        subs.listen::<OrderPlaced, _>(Arc::clone(&self))
            .listen::<Heartbeat, _>(self);
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Dispatcher::builder(Config::default())
        .with_listeners(vec![Arc::new(Billing) as Arc<dyn Subscribe>])
        .build()?;

    bus.register::<OrderEvent, _>(ListenerFn::arc("audit", |ev: OrderEvent| async move {
        println!("[audit] order {} seen", ev.id);
        Ok::<_, ListenerError>(())
    }));

    let placed = OrderPlaced {
        order: OrderEvent { id: 1 },
        total_cents: 4_200,
    };

    // Inline: both the OrderEvent and the OrderPlaced listener run before this returns.
    let attempted = bus.dispatch(placed.clone()).await?;
    println!("[main] inline dispatch reached {attempted} listeners");

    // Failures are collected, siblings still run.
    let empty = OrderPlaced {
        order: OrderEvent { id: 2 },
        total_cents: 0,
    };
    if let Err(err) = bus.dispatch(empty).await {
        println!("[main] {err}");
    }

    // Fire-and-forget: only the audit listener matches a plain OrderEvent.
    let submitted = bus.dispatch_async(OrderEvent { id: 3 });
    println!("[main] submitted {submitted} detached tasks");

    // Callback: fires once billing and audit are both finished.
    let (tx, rx) = oneshot::channel();
    bus.dispatch_with_callback(placed, move || {
        let _ = tx.send(());
    });
    rx.await?;
    println!("[main] all listeners of order 1 finished");

    bus.dispatch(Heartbeat).await?;
    Ok(())
}
