//! # Cache Configuration
//!
//! Process-wide cache settings and the shared dispatch context, held in an
//! explicit object that callers share by `Arc` instead of mutable statics.
//!
//! ## Architecture
//!
//! - [`CacheSettings`] is the plain, serializable settings document produced by
//!   the [`ConfigLoader`] (defaults, files, environment).
//! - [`CacheConfiguration`] is the runtime holder. Mutable fields live behind a
//!   single `RwLock`, so every read sees values that were written together, and
//!   the dispatch context is created once at construction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scs_core::config::{CacheConfiguration, CacheSettings, ZeroLimitPolicy};
//!
//! # fn main() -> scs_core::Result<()> {
//! let config = CacheConfiguration::new(CacheSettings::default())?;
//! config.set_cache_limit(500)?;
//! config.set_debug_enabled(true);
//!
//! let bound = config.limit_bound(ZeroLimitPolicy::Unbounded);
//! config.dispatch(move || {
//!     let _ = bound;
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod limits;
pub mod loader;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::constants::{
    DEBUG_IDENTIFIER, DEFAULT_CACHE_LIMIT, DEFAULT_DEBUG_MODE, DEFAULT_DISPATCH_THREAD_NAME,
    DEFAULT_ERROR_LOG_FILE, DEFAULT_LABEL,
};
use crate::dispatch::{DispatchQueue, Dispatcher};
use crate::error::{Result, ScsError};
use crate::state_machine::CacheMode;

pub use limits::{LimitBound, ZeroLimitPolicy};
pub use loader::ConfigLoader;

/// Settings document for the cache core
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Raw entry bound, see [`ZeroLimitPolicy`] for the meaning of zero
    pub cache_limit: i64,
    pub cache_mode: CacheMode,
    pub error_log_file: String,
    pub debug_mode: bool,
    pub dispatch: DispatchSettings,
}

/// Sizing of the shared dispatch queue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_limit: DEFAULT_CACHE_LIMIT,
            cache_mode: CacheMode::default(),
            error_log_file: DEFAULT_ERROR_LOG_FILE.to_string(),
            debug_mode: DEFAULT_DEBUG_MODE,
            dispatch: DispatchSettings::default(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            thread_name: DEFAULT_DISPATCH_THREAD_NAME.to_string(),
        }
    }
}

impl CacheSettings {
    /// Validate every field, returning the first violation found
    pub fn validate(&self) -> Result<()> {
        validate_cache_limit(self.cache_limit)?;
        validate_log_file_path(&self.error_log_file)?;

        if self.dispatch.worker_threads == 0 {
            return Err(ScsError::invalid_value(
                "dispatch.worker_threads",
                self.dispatch.worker_threads,
                "dispatch queue needs at least one worker thread",
            ));
        }
        if self.dispatch.thread_name.trim().is_empty() {
            return Err(ScsError::invalid_value(
                "dispatch.thread_name",
                "\"\"",
                "thread name must not be empty",
            ));
        }
        Ok(())
    }
}

fn validate_cache_limit(limit: i64) -> Result<()> {
    if limit < 0 {
        return Err(ScsError::invalid_value(
            "cache_limit",
            limit,
            "cache limit must not be negative",
        ));
    }
    Ok(())
}

fn validate_log_file_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(ScsError::invalid_value(
            "error_log_file",
            "\"\"",
            "error log file path must not be empty",
        ));
    }
    Ok(())
}

/// Consistent copy of every mutable field, taken under one lock acquisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub cache_limit: i64,
    pub cache_mode: CacheMode,
    pub error_log_file: String,
    pub debug_mode: bool,
    /// Incremented on every successful mutation
    pub generation: u64,
}

#[derive(Debug)]
struct MutableState {
    cache_limit: i64,
    cache_mode: CacheMode,
    error_log_file: String,
    debug_mode: bool,
    generation: u64,
}

impl MutableState {
    fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            cache_limit: settings.cache_limit,
            cache_mode: settings.cache_mode,
            error_log_file: settings.error_log_file.clone(),
            debug_mode: settings.debug_mode,
            generation: 0,
        }
    }
}

static NEXT_CONFIG_ID: AtomicU64 = AtomicU64::new(1);

/// Thread-safe cache configuration shared by every cache operation
pub struct CacheConfiguration {
    id: u64,
    state: RwLock<MutableState>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl CacheConfiguration {
    /// Build a configuration and its dispatch queue from validated settings
    pub fn new(settings: CacheSettings) -> Result<Self> {
        settings.validate()?;
        let queue = DispatchQueue::from_settings(&settings.dispatch)?;
        Ok(Self::build(&settings, Arc::new(queue)))
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(CacheSettings::default())
    }

    /// Build a configuration around an existing scheduler. The `dispatch`
    /// section of `settings` is ignored.
    pub fn with_dispatcher(
        settings: CacheSettings,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self> {
        validate_cache_limit(settings.cache_limit)?;
        validate_log_file_path(&settings.error_log_file)?;
        Ok(Self::build(&settings, dispatcher))
    }

    fn build(settings: &CacheSettings, dispatcher: Arc<dyn Dispatcher>) -> Self {
        debug!(
            cache_limit = settings.cache_limit,
            cache_mode = %settings.cache_mode,
            debug_mode = settings.debug_mode,
            dispatcher = dispatcher.name(),
            "{DEBUG_IDENTIFIER} cache configuration created"
        );
        Self {
            id: NEXT_CONFIG_ID.fetch_add(1, Ordering::Relaxed),
            state: RwLock::new(MutableState::from_settings(settings)),
            dispatcher,
        }
    }

    pub fn cache_limit(&self) -> i64 {
        self.state.read().cache_limit
    }

    /// Set the raw cache limit. Negative values are rejected and leave the
    /// current limit untouched.
    pub fn set_cache_limit(&self, limit: i64) -> Result<()> {
        validate_cache_limit(limit)?;
        let mut state = self.state.write();
        let previous = std::mem::replace(&mut state.cache_limit, limit);
        state.generation += 1;
        debug!(previous, current = limit, "{DEBUG_IDENTIFIER} cache limit updated");
        Ok(())
    }

    /// Effective bound under the caller's reading of a zero limit
    pub fn limit_bound(&self, policy: ZeroLimitPolicy) -> LimitBound {
        // set_cache_limit never stores a negative value
        let raw = u64::try_from(self.cache_limit()).unwrap_or(0);
        LimitBound::resolve(raw, policy)
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.state.read().cache_mode
    }

    pub fn set_cache_mode(&self, mode: CacheMode) {
        let mut state = self.state.write();
        let previous = std::mem::replace(&mut state.cache_mode, mode);
        state.generation += 1;
        debug!(previous = %previous, current = %mode, "{DEBUG_IDENTIFIER} cache mode updated");
    }

    /// Parse and set a mode by name. Unknown names fail with
    /// [`ScsError::InvalidConfiguration`] and keep the current mode.
    pub fn set_cache_mode_str(&self, mode: &str) -> Result<()> {
        let mode = mode.parse::<CacheMode>()?;
        self.set_cache_mode(mode);
        Ok(())
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.state.read().debug_mode
    }

    /// Toggle debug mode. The running log level follows when this
    /// configuration initialized logging.
    pub fn set_debug_enabled(&self, enabled: bool) {
        {
            let mut state = self.state.write();
            state.debug_mode = enabled;
            state.generation += 1;
        }
        debug!(enabled, "{DEBUG_IDENTIFIER} debug mode updated");
        crate::logging::refresh(self);
    }

    pub fn log_file_path(&self) -> String {
        self.state.read().error_log_file.clone()
    }

    /// Change the error log path. A running error log switches files when
    /// this configuration initialized logging.
    pub fn set_log_file_path(&self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        validate_log_file_path(&path)?;
        let previous = {
            let mut state = self.state.write();
            state.generation += 1;
            std::mem::replace(&mut state.error_log_file, path.clone())
        };
        debug!(
            previous = %previous,
            current = %path,
            "{DEBUG_IDENTIFIER} error log file updated"
        );
        crate::logging::refresh(self);
        Ok(())
    }

    pub fn default_label(&self) -> &'static str {
        DEFAULT_LABEL
    }

    pub fn debug_prefix(&self) -> &'static str {
        DEBUG_IDENTIFIER
    }

    /// Submit work to the shared dispatch context without blocking
    pub fn dispatch<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatcher.dispatch(Box::new(task))
    }

    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Process-unique identity, used to bind logging to one configuration
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        let state = self.state.read();
        ConfigSnapshot {
            cache_limit: state.cache_limit,
            cache_mode: state.cache_mode,
            error_log_file: state.error_log_file.clone(),
            debug_mode: state.debug_mode,
            generation: state.generation,
        }
    }

    /// Replace every mutable field at once. The dispatch context is created
    /// once and is not rebuilt, so `settings.dispatch` is ignored here.
    pub fn apply(&self, settings: &CacheSettings) -> Result<()> {
        validate_cache_limit(settings.cache_limit)?;
        validate_log_file_path(&settings.error_log_file)?;

        let generation = {
            let mut state = self.state.write();
            let generation = state.generation + 1;
            *state = MutableState {
                generation,
                ..MutableState::from_settings(settings)
            };
            generation
        };
        debug!(generation, "{DEBUG_IDENTIFIER} settings applied");
        crate::logging::refresh(self);
        Ok(())
    }
}

impl std::fmt::Debug for CacheConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfiguration")
            .field("state", &self.snapshot())
            .field("dispatcher", &self.dispatcher.name())
            .finish()
    }
}
