//! # Constants
//!
//! Fixed labels and defaults shared by every cache operation. The label and
//! debug identifier are part of the public contract and never change at runtime.

/// Namespace applied to cache entries stored without an explicit label
pub const DEFAULT_LABEL: &str = "default";

/// Prefix for every diagnostic line emitted by the cache core
pub const DEBUG_IDENTIFIER: &str = "[SCS]";

/// Default destination of the error log
pub const DEFAULT_ERROR_LOG_FILE: &str = "scserror.log";

/// Raw default cache limit. Its meaning is decided by the cache store,
/// see [`crate::config::ZeroLimitPolicy`].
pub const DEFAULT_CACHE_LIMIT: i64 = 0;

pub const DEFAULT_DEBUG_MODE: bool = false;

/// Thread name prefix for the shared dispatch queue workers
pub const DEFAULT_DISPATCH_THREAD_NAME: &str = "scs-dispatch";

/// Settings file discovery and environment overrides
pub mod env {
    pub const ENV_PREFIX: &str = "SCS";
    pub const ENVIRONMENT_VARS: &[&str] = &["SCS_ENV", "APP_ENV"];
    pub const DEFAULT_ENVIRONMENT: &str = "development";
    pub const CONFIG_DIR_VAR: &str = "SCS_CONFIG_DIR";
    pub const DEFAULT_CONFIG_DIR: &str = "config";
    pub const BASE_FILE_STEM: &str = "scs";
}
