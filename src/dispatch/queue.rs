//! # Dispatch Queue
//!
//! Thread pool backing the shared dispatch context. Workers pull tasks from an
//! unbounded crossbeam channel, so submission never blocks and several tasks
//! run at the same time in no particular order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{Dispatcher, Task};
use crate::config::DispatchSettings;
use crate::constants::DEBUG_IDENTIFIER;
use crate::error::{Result, ScsError};

#[derive(Debug, Default)]
struct QueueCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
}

/// Point-in-time view of queue activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub submitted: u64,
    pub completed: u64,
    pub panicked: u64,
    pub pending: usize,
    pub workers: usize,
}

/// Unbounded concurrent work queue served by a fixed set of worker threads
pub struct DispatchQueue {
    name: String,
    /// `None` once the queue has been shut down
    sender: RwLock<Option<Sender<Task>>>,
    /// Kept only to report the backlog length
    backlog: Receiver<Task>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    counters: Arc<QueueCounters>,
}

impl DispatchQueue {
    /// Create a queue and spawn `worker_threads` workers named `<thread_name>-<n>`
    pub fn new(worker_threads: usize, thread_name: &str) -> Result<Self> {
        if worker_threads == 0 {
            return Err(ScsError::invalid_value(
                "dispatch.worker_threads",
                worker_threads,
                "dispatch queue needs at least one worker thread",
            ));
        }

        let (sender, receiver) = unbounded::<Task>();
        let counters = Arc::new(QueueCounters::default());
        let mut workers = Vec::with_capacity(worker_threads);

        for index in 0..worker_threads {
            let worker_name = format!("{thread_name}-{index}");
            let handle = Self::spawn_worker(worker_name, receiver.clone(), counters.clone())
                .map_err(|e| {
                    ScsError::dispatch_unavailable(format!(
                        "failed to spawn worker {index} for '{thread_name}': {e}"
                    ))
                })?;
            workers.push(handle);
        }

        info!(
            queue = %thread_name,
            workers = worker_threads,
            "{DEBUG_IDENTIFIER} dispatch queue started"
        );

        Ok(Self {
            name: thread_name.to_string(),
            sender: RwLock::new(Some(sender)),
            backlog: receiver,
            workers: Mutex::new(workers),
            worker_count: worker_threads,
            counters,
        })
    }

    pub fn from_settings(settings: &DispatchSettings) -> Result<Self> {
        Self::new(settings.worker_threads, &settings.thread_name)
    }

    fn spawn_worker(
        thread_name: String,
        receiver: Receiver<Task>,
        counters: Arc<QueueCounters>,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name(thread_name).spawn(move || {
            // recv fails only once every sender is gone and the backlog is drained
            while let Ok(task) = receiver.recv() {
                match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(()) => {
                        counters.completed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(payload) => {
                        counters.panicked.fetch_add(1, Ordering::SeqCst);
                        error!(
                            worker = thread::current().name().unwrap_or("unnamed"),
                            panic = %panic_message(payload.as_ref()),
                            "{DEBUG_IDENTIFIER} dispatched task panicked"
                        );
                    }
                }
            }
            debug!(
                worker = thread::current().name().unwrap_or("unnamed"),
                "{DEBUG_IDENTIFIER} dispatch worker exiting"
            );
        })
    }

    pub fn is_accepting(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Number of submitted tasks no worker has picked up yet
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Number of tasks that ran to completion without panicking
    pub fn completed(&self) -> u64 {
        self.counters.completed.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn stats(&self) -> DispatchStats {
        // finished counts are read before submitted so they can never exceed it
        let completed = self.counters.completed.load(Ordering::SeqCst);
        let panicked = self.counters.panicked.load(Ordering::SeqCst);
        DispatchStats {
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            completed,
            panicked,
            pending: self.pending(),
            workers: self.worker_count,
        }
    }

    /// Close the queue, let workers drain the backlog, then join them.
    ///
    /// Calling this from inside a dispatched task closes the queue but skips
    /// joining the calling worker.
    pub fn close(&self) {
        if self.sender.write().take().is_none() {
            return;
        }

        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        let current = thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!(
                    queue = %self.name,
                    "{DEBUG_IDENTIFIER} dispatch worker terminated abnormally"
                );
            }
        }

        info!(
            queue = %self.name,
            completed = self.counters.completed.load(Ordering::SeqCst),
            "{DEBUG_IDENTIFIER} dispatch queue shut down"
        );
    }
}

impl Dispatcher for DispatchQueue {
    fn dispatch(&self, task: Task) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or_else(|| {
            ScsError::dispatch_unavailable(format!("dispatch queue '{}' is shut down", self.name))
        })?;

        // counted before sending so a fast worker never reports completed > submitted
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        sender.send(task).map_err(|_| {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
            ScsError::dispatch_unavailable(format!(
                "dispatch queue '{}' has no running workers",
                self.name
            ))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&self) {
        self.close();
    }
}

impl Drop for DispatchQueue {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("name", &self.name)
            .field("workers", &self.worker_count)
            .field("accepting", &self.is_accepting())
            .field("pending", &self.pending())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;
    use std::time::{Duration, Instant};

    #[test]
    fn test_rejects_zero_workers() {
        let err = DispatchQueue::new(0, "scs-test").unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_runs_dispatched_tasks() {
        let queue = DispatchQueue::new(4, "scs-test").unwrap();
        let (done_tx, done_rx) = unbounded();

        for i in 0..32 {
            let done_tx = done_tx.clone();
            queue
                .dispatch(Box::new(move || {
                    done_tx.send(i).unwrap();
                }))
                .unwrap();
        }

        let mut seen: Vec<i32> = (0..32)
            .map(|_| done_rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
        assert_eq!(queue.stats().submitted, 32);
    }

    #[test]
    fn test_dispatch_does_not_block_with_busy_workers() {
        let queue = DispatchQueue::new(1, "scs-test").unwrap();
        let (release_tx, release_rx) = bounded::<()>(0);

        queue
            .dispatch(Box::new(move || {
                let _ = release_rx.recv();
            }))
            .unwrap();

        let started = Instant::now();
        for _ in 0..10_000 {
            queue.dispatch(Box::new(|| {})).unwrap();
        }
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(queue.pending() > 0);

        release_tx.send(()).unwrap();
        queue.close();
        assert_eq!(queue.stats().completed, 10_001);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_dispatch_after_shutdown_fails() {
        let queue = DispatchQueue::new(2, "scs-test").unwrap();
        queue.shutdown();
        assert!(!queue.is_accepting());

        let err = queue.dispatch(Box::new(|| {})).unwrap_err();
        assert!(matches!(err, ScsError::DispatchUnavailable(_)));
        assert_eq!(queue.stats().submitted, 0);

        // second shutdown is a no-op
        queue.shutdown();
    }

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let queue = DispatchQueue::new(1, "scs-test").unwrap();
        let (done_tx, done_rx) = unbounded();

        queue.dispatch(Box::new(|| panic!("boom"))).unwrap();
        queue
            .dispatch(Box::new(move || {
                done_tx.send(()).unwrap();
            }))
            .unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        queue.close();
        let stats = queue.stats();
        assert_eq!(stats.panicked, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_close_from_inside_task() {
        let queue = Arc::new(DispatchQueue::new(2, "scs-test").unwrap());
        let (done_tx, done_rx) = unbounded();

        let inner = queue.clone();
        queue
            .dispatch(Box::new(move || {
                inner.close();
                done_tx.send(inner.is_accepting()).unwrap();
            }))
            .unwrap();

        let accepting = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!accepting);
    }

    #[test]
    fn test_completed_never_exceeds_submitted() {
        let queue = Arc::new(DispatchQueue::new(4, "scs-test").unwrap());
        let observer = {
            let queue = queue.clone();
            thread::spawn(move || {
                for _ in 0..20_000 {
                    let stats = queue.stats();
                    assert!(stats.completed + stats.panicked <= stats.submitted);
                }
            })
        };

        for _ in 0..5_000 {
            queue.dispatch(Box::new(|| {})).unwrap();
        }
        observer.join().unwrap();
        queue.close();
        assert_eq!(queue.completed(), 5_000);
        assert_eq!(queue.stats().submitted, 5_000);
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
