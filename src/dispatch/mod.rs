//! # Dispatch Context
//!
//! The shared concurrent execution facility cache operations use for
//! background work. Callers only see the [`Dispatcher`] trait, so the
//! scheduler behind it can be swapped without touching the cache store.
//!
//! Two schedulers ship with the crate:
//!
//! - [`DispatchQueue`] - a pool of worker threads fed by an unbounded channel
//! - [`TokioDispatcher`] - runs work on a tokio runtime's blocking pool
//!
//! Neither guarantees FIFO execution across tasks, and submitted tasks have
//! no cancellation handle.

pub mod queue;
pub mod runtime;

pub use queue::{DispatchQueue, DispatchStats};
pub use runtime::TokioDispatcher;

use crate::error::Result;

/// A unit of work submitted to the dispatch context
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Minimal submit-task interface over a concurrent scheduler
pub trait Dispatcher: Send + Sync {
    /// Submit a task for asynchronous execution without blocking the caller.
    fn dispatch(&self, task: Task) -> Result<()>;

    /// Human readable scheduler name for diagnostics
    fn name(&self) -> &str;

    /// Stop accepting new work. Schedulers that cannot be stopped ignore this.
    fn shutdown(&self) {}
}

impl std::fmt::Debug for dyn Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("name", &self.name()).finish()
    }
}
