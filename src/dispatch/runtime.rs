//! Tokio-backed dispatcher for hosts that already run a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::{Dispatcher, Task};
use crate::constants::DEBUG_IDENTIFIER;
use crate::error::{Result, ScsError};

/// Runs dispatched tasks on a tokio runtime's blocking thread pool
#[derive(Debug, Clone)]
pub struct TokioDispatcher {
    handle: Handle,
    name: String,
    closed: Arc<AtomicBool>,
}

impl TokioDispatcher {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            name: "tokio-blocking".to_string(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind to the runtime the caller is running on
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            ScsError::dispatch_unavailable(format!("no tokio runtime available: {e}"))
        })?;
        Ok(Self::new(handle))
    }

    pub fn is_accepting(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

impl Dispatcher for TokioDispatcher {
    fn dispatch(&self, task: Task) -> Result<()> {
        if !self.is_accepting() {
            return Err(ScsError::dispatch_unavailable(format!(
                "dispatcher '{}' is shut down",
                self.name
            )));
        }

        let started = Arc::new(AtomicBool::new(false));
        let started_flag = Arc::clone(&started);
        let join_handle = self.handle.spawn_blocking(move || {
            started_flag.store(true, Ordering::Release);
            task();
        });

        // A runtime that is shutting down drops the task unrun and completes
        // the handle before spawn_blocking returns.
        if join_handle.is_finished() && !started.load(Ordering::Acquire) {
            self.closed.store(true, Ordering::Release);
            warn!(
                dispatcher = %self.name,
                "{DEBUG_IDENTIFIER} tokio runtime no longer accepts work"
            );
            return Err(ScsError::dispatch_unavailable(format!(
                "tokio runtime behind '{}' is shut down",
                self.name
            )));
        }

        debug!(dispatcher = %self.name, "{DEBUG_IDENTIFIER} task handed to tokio");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(dispatcher = %self.name, "{DEBUG_IDENTIFIER} tokio dispatcher closed");
        }
    }
}
