//! Process-wide configuration instance.
//!
//! Most code should receive an `Arc<CacheConfiguration>` explicitly. This
//! module exists for hosts that want one shared instance, created once at
//! first access and never torn down.

use parking_lot::{const_mutex, Mutex};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::config::{CacheConfiguration, CacheSettings, ConfigLoader};
use crate::constants::DEBUG_IDENTIFIER;
use crate::error::{Result, ScsError};

static SHARED: OnceLock<Arc<CacheConfiguration>> = OnceLock::new();
static INIT_LOCK: Mutex<()> = const_mutex(());

/// Get the shared configuration, creating it from [`ConfigLoader`] on first
/// access. Load failures fall back to default settings.
pub fn shared() -> Result<Arc<CacheConfiguration>> {
    if let Some(config) = SHARED.get() {
        return Ok(Arc::clone(config));
    }

    let _guard = INIT_LOCK.lock();
    if let Some(config) = SHARED.get() {
        return Ok(Arc::clone(config));
    }

    let settings = ConfigLoader::new().load().unwrap_or_else(|e| {
        warn!(
            error = %e,
            "{DEBUG_IDENTIFIER} failed to load cache settings, using defaults"
        );
        CacheSettings::default()
    });
    store(settings)
}

/// Create the shared configuration from explicit settings. Fails if the
/// shared instance already exists.
pub fn install(settings: CacheSettings) -> Result<Arc<CacheConfiguration>> {
    let _guard = INIT_LOCK.lock();
    if SHARED.get().is_some() {
        return Err(ScsError::invalid_value(
            "global",
            "install",
            "process-wide cache configuration is already initialized",
        ));
    }
    store(settings)
}

pub fn is_initialized() -> bool {
    SHARED.get().is_some()
}

// Callers hold INIT_LOCK
fn store(settings: CacheSettings) -> Result<Arc<CacheConfiguration>> {
    let config = Arc::new(CacheConfiguration::new(settings)?);
    // set cannot fail while INIT_LOCK is held and SHARED is empty
    let _ = SHARED.set(Arc::clone(&config));
    info!("{DEBUG_IDENTIFIER} process-wide cache configuration initialized");
    Ok(config)
}
