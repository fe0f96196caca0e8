//! Dispatch context integration tests

mod common;

use common::{shared_config, test_settings};
use crossbeam::channel::{bounded, unbounded};
use parking_lot::Mutex;
use scs_core::{
    CacheConfiguration, DispatchQueue, Dispatcher, Result, ScsError, Task, TokioDispatcher,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs tasks inline and records how many it saw
#[derive(Default)]
struct InlineDispatcher {
    runs: Mutex<usize>,
}

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) -> Result<()> {
        *self.runs.lock() += 1;
        task();
        Ok(())
    }

    fn name(&self) -> &str {
        "inline"
    }
}

#[test]
fn configuration_accepts_injected_dispatcher() {
    let inline = Arc::new(InlineDispatcher::default());
    let config =
        CacheConfiguration::with_dispatcher(test_settings("unused"), inline.clone()).unwrap();

    let (tx, rx) = unbounded();
    config.dispatch(move || tx.send(1).unwrap()).unwrap();
    config.dispatch(|| {}).unwrap();

    assert_eq!(rx.try_recv().unwrap(), 1);
    assert_eq!(*inline.runs.lock(), 2);
    assert_eq!(config.dispatcher().name(), "inline");
}

#[test]
fn dispatcher_is_shared_not_duplicated() {
    let config = shared_config("scs-shared-dispatch");
    let first = config.dispatcher();
    let second = config.dispatcher();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn dispatch_returns_while_workers_are_blocked() {
    let config = shared_config("scs-busy");
    let (release_tx, release_rx) = bounded::<()>(0);
    let (done_tx, done_rx) = unbounded();

    for _ in 0..2 {
        let release_rx = release_rx.clone();
        config
            .dispatch(move || {
                let _ = release_rx.recv();
            })
            .unwrap();
    }

    let started = Instant::now();
    for i in 0..5_000 {
        let done_tx = done_tx.clone();
        config.dispatch(move || done_tx.send(i).unwrap()).unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(2));

    release_tx.send(()).unwrap();
    release_tx.send(()).unwrap();

    for _ in 0..5_000 {
        done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    }
}

#[test]
fn tasks_run_concurrently() {
    let config = shared_config("scs-parallel");
    let (arrive_tx, arrive_rx) = unbounded();
    let (release_tx, release_rx) = bounded::<()>(2);

    for _ in 0..2 {
        let arrive_tx = arrive_tx.clone();
        let release_rx = release_rx.clone();
        config
            .dispatch(move || {
                arrive_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
            .unwrap();
    }

    // both tasks must be running at once before either is released
    arrive_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    arrive_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    release_tx.send(()).unwrap();
    release_tx.send(()).unwrap();
}

#[test]
fn closed_queue_reports_unavailable() {
    let queue = Arc::new(DispatchQueue::new(1, "scs-closed").unwrap());
    let config =
        CacheConfiguration::with_dispatcher(test_settings("unused"), queue.clone()).unwrap();

    config.dispatch(|| {}).unwrap();
    queue.close();

    let err = config.dispatch(|| {}).unwrap_err();
    assert!(matches!(err, ScsError::DispatchUnavailable(_)));
    assert_eq!(queue.stats().completed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_dispatcher_backs_configuration() {
    let dispatcher = Arc::new(TokioDispatcher::current().unwrap());
    let config = CacheConfiguration::with_dispatcher(test_settings("unused"), dispatcher).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    config
        .dispatch(move || {
            let _ = tx.send("ran on tokio");
        })
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message, "ran on tokio");
}
