//! # Deliver one event to one listener.
//!
//! Every delivery mode funnels through [`deliver`], which runs a single listener
//! invocation in isolation and reports its outcome.
//!
//! ## Outcomes
//! ```text
//! on_event → Ok(())  ─► Ok
//! on_event → Err(e)  ─► warn! ─► Err(FailureCause::Error(e))
//! on_event panics    ─► warn! ─► Err(FailureCause::Panicked(msg))
//! ```
//!
//! ## Rules
//! - Panics are caught with `catch_unwind`; they never escape into the caller or worker.
//! - Every failure is logged here exactly once; callers decide whether to collect it.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a listener uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::warn;

use crate::error::{FailureCause, ListenerFailure};
use crate::events::Event;
use crate::listeners::ErasedListener;

/// Runs one listener against one event, containing errors and panics.
pub(crate) async fn deliver(
    listener: &Arc<dyn ErasedListener>,
    event: Arc<dyn Event>,
) -> Result<(), ListenerFailure> {
    let event_name = event.event_type().name();
    let fut = listener.deliver(event);

    let cause = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => FailureCause::Error(err),
        Err(panic) => FailureCause::Panicked(panic_message(panic.as_ref())),
    };

    let failure = ListenerFailure {
        listener: listener.name().to_string(),
        event: event_name,
        cause,
    };
    warn!(
        listener = %failure.listener,
        event = failure.event,
        kind = failure.as_label(),
        error = %failure.cause,
        "listener failed"
    );
    Err(failure)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::{EventListener, Typed};
    use async_trait::async_trait;

    struct Ping;
    crate::impl_event!(Ping);

    enum Behavior {
        Succeed,
        Fail,
        Panic,
    }

    struct Scripted(Behavior);

    #[async_trait]
    impl EventListener<Ping> for Scripted {
        async fn on_event(&self, _: &Ping) -> Result<(), ListenerError> {
            match self.0 {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => Err(ListenerError::fail("nope")),
                Behavior::Panic => panic!("kaboom"),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    async fn run(behavior: Behavior) -> Result<(), ListenerFailure> {
        let listener = Typed::<Ping, _>::erase(Arc::new(Scripted(behavior)));
        deliver(&listener, Arc::new(Ping)).await
    }

    #[tokio::test]
    async fn test_success() {
        assert!(run(Behavior::Succeed).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let failure = run(Behavior::Fail).await.unwrap_err();
        assert_eq!(failure.listener, "scripted");
        assert!(failure.event.ends_with("Ping"));
        assert!(matches!(
            failure.cause,
            FailureCause::Error(ListenerError::Fail { .. })
        ));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let failure = run(Behavior::Panic).await.unwrap_err();
        assert!(failure.is_panic());
        assert!(matches!(failure.cause, FailureCause::Panicked(ref msg) if msg == "kaboom"));
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
