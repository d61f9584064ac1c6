//! Ordered delivery through event chains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use typebus::{
    ChainState, Dispatcher, EventChain, EventListener, EventType, ListenerError, ListenerFn,
    impl_event,
};

#[derive(Clone, Debug)]
struct First;
#[derive(Clone, Debug)]
struct Second;
#[derive(Clone, Debug)]
struct Third;
#[derive(Clone, Debug)]
struct Counted(usize);

impl_event!(First);
impl_event!(Second);
impl_event!(Third);
impl_event!(Counted);

type Log = Arc<Mutex<Vec<String>>>;

/// Logs `start`/`end` around a sleep of `ms`.
fn traced<E: Clone + Send + Sync + 'static>(
    log: &Log,
    name: &'static str,
    ms: u64,
) -> Arc<impl EventListener<E>> {
    let log = Arc::clone(log);
    ListenerFn::arc(name, move |_: E| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("{name}:start"));
            tokio::time::sleep(Duration::from_millis(ms)).await;
            log.lock().unwrap().push(format!("{name}:end"));
            Ok::<_, ListenerError>(())
        }
    })
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {log:?}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn events_are_delivered_strictly_in_order() {
    let bus = Dispatcher::new().unwrap();
    let log: Log = Arc::default();
    bus.register::<First, _>(traced::<First>(&log, "first-slow", 40));
    bus.register::<First, _>(traced::<First>(&log, "first-fast", 5));
    bus.register::<Second, _>(traced::<Second>(&log, "second", 10));
    bus.register::<Third, _>(traced::<Third>(&log, "third", 1));

    let chain = EventChain::new().with(First).with(Second).with(Third);
    let state = tokio::time::timeout(Duration::from_secs(2), bus.dispatch_chain(chain).finished())
        .await
        .unwrap();
    assert_eq!(state, ChainState::Done);

    let log = log.lock().unwrap().clone();
    assert_eq!(log.len(), 8);
    let second_start = position(&log, "second:start");
    assert!(position(&log, "first-slow:end") < second_start);
    assert!(position(&log, "first-fast:end") < second_start);
    assert!(position(&log, "second:end") < position(&log, "third:start"));
}

#[tokio::test]
async fn events_without_listeners_do_not_stall_the_chain() {
    let bus = Dispatcher::new().unwrap();
    let log: Log = Arc::default();
    bus.register::<Third, _>(traced::<Third>(&log, "third", 1));

    let chain = EventChain::new().with(First).with(Second).with(Third);
    let state = bus.dispatch_chain(chain).finished().await;

    assert_eq!(state, ChainState::Done);
    assert_eq!(*log.lock().unwrap(), vec!["third:start", "third:end"]);
}

#[tokio::test]
async fn empty_chain_ends_done_without_dispatching() {
    let bus = Dispatcher::new().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    bus.register::<First, _>(ListenerFn::arc("first", move |_: First| {
        let h = Arc::clone(&h);
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ListenerError>(())
        }
    }));

    let progress = bus.dispatch_chain(EventChain::new());
    assert_eq!(progress.state(), ChainState::Done);
    assert_eq!(progress.finished().await, ChainState::Done);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn interrupt_halts_the_chain_and_abandons_the_rest() {
    let bus = Dispatcher::new().unwrap();
    let gate = Arc::new(Notify::new());
    let g = Arc::clone(&gate);
    bus.register::<First, _>(ListenerFn::arc("blocked", move |_: First| {
        let g = Arc::clone(&g);
        async move {
            g.notified().await;
            Ok::<_, ListenerError>(())
        }
    }));
    let later = Arc::new(AtomicUsize::new(0));
    let l = Arc::clone(&later);
    bus.register::<Second, _>(ListenerFn::arc("second", move |_: Second| {
        let l = Arc::clone(&l);
        async move {
            l.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ListenerError>(())
        }
    }));

    let chain = EventChain::new().with(First).with(Second).with(Third);
    let progress = bus.dispatch_chain(chain);
    assert_eq!(
        progress.state(),
        ChainState::Draining {
            event: EventType::of::<First>(),
            remaining: 2
        }
    );

    bus.interrupt();
    let state = tokio::time::timeout(Duration::from_secs(1), progress.finished())
        .await
        .unwrap();
    assert_eq!(
        state,
        ChainState::Halted {
            event: Some(EventType::of::<First>()),
            abandoned: 2
        }
    );

    gate.notify_waiters();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chain_started_after_interrupt_completes() {
    let bus = Dispatcher::new().unwrap();
    let log: Log = Arc::default();
    bus.register::<First, _>(traced::<First>(&log, "first", 1));
    bus.register::<Third, _>(traced::<Third>(&log, "third", 1));

    bus.interrupt();

    let chain = EventChain::new().with(First).with(Second).with(Third);
    let state = tokio::time::timeout(Duration::from_secs(1), bus.dispatch_chain(chain).finished())
        .await
        .unwrap();
    assert_eq!(state, ChainState::Done);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first:start", "first:end", "third:start", "third:end"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn long_chains_drain_without_recursion() {
    let bus = Dispatcher::new().unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    let o = Arc::clone(&order);
    bus.register::<Counted, _>(ListenerFn::arc("order", move |ev: Counted| {
        let o = Arc::clone(&o);
        async move {
            o.lock().unwrap().push(ev.0);
            Ok::<_, ListenerError>(())
        }
    }));

    let chain: EventChain = (0..5_000).fold(EventChain::new(), |chain, i| chain.with(Counted(i)));
    let state = tokio::time::timeout(Duration::from_secs(10), bus.dispatch_chain(chain).finished())
        .await
        .unwrap();

    assert_eq!(state, ChainState::Done);
    let order = order.lock().unwrap();
    assert_eq!(order.len(), 5_000);
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn progress_handle_can_be_dropped() {
    let bus = Dispatcher::new().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    bus.register::<Second, _>(ListenerFn::arc("second", move |_: Second| {
        let h = Arc::clone(&h);
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ListenerError>(())
        }
    }));

    drop(bus.dispatch_chain(EventChain::new().with(First).with(Second)));

    tokio::time::timeout(Duration::from_secs(1), async {
        while hits.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();
}
