#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow accessors without must_use when context is clear

//! # SimpleCacheStore Core
//!
//! Thread-safe configuration and dispatch core for the SimpleCacheStore
//! caching library.
//!
//! ## Overview
//!
//! A cache store reads this configuration before every operation and submits
//! background work to the shared dispatch context. The core itself stores no
//! cache entries and runs no eviction; it owns:
//!
//! - the cache limit, cache mode, error log path, and debug flag
//! - the fixed default label (`"default"`) and debug identifier (`"[SCS]"`)
//! - one shared concurrent dispatch context per configuration
//!
//! ## Module Organization
//!
//! - [`config`] - Settings, runtime configuration holder, and loader
//! - [`state_machine`] - Cache mode definitions
//! - [`dispatch`] - Dispatch context trait and schedulers
//! - [`global`] - Optional process-wide instance
//! - [`logging`] - Structured logging with the `[SCS]` identifier
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scs_core::{CacheConfiguration, CacheMode, ConfigLoader};
//!
//! # fn main() -> scs_core::Result<()> {
//! let settings = ConfigLoader::new().load()?;
//! let config = Arc::new(CacheConfiguration::new(settings)?);
//! scs_core::logging::init_structured_logging(&config);
//!
//! config.set_cache_mode(CacheMode::Rebuild);
//! let worker_view = Arc::clone(&config);
//! config.dispatch(move || {
//!     let _limit = worker_view.cache_limit();
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod logging;
pub mod state_machine;

pub use crate::config::{
    CacheConfiguration, CacheSettings, ConfigLoader, ConfigSnapshot, DispatchSettings,
    LimitBound, ZeroLimitPolicy,
};
pub use constants::{DEBUG_IDENTIFIER, DEFAULT_ERROR_LOG_FILE, DEFAULT_LABEL};
pub use dispatch::{DispatchQueue, DispatchStats, Dispatcher, Task, TokioDispatcher};
pub use error::{Result, ScsError};
pub use state_machine::CacheMode;
