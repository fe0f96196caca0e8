//! Shared helpers for integration tests

#![allow(dead_code)]

use scs_core::{CacheConfiguration, CacheSettings, DispatchSettings};
use std::sync::Arc;

/// Settings with a small, named dispatch pool so test threads are easy to spot
pub fn test_settings(thread_name: &str) -> CacheSettings {
    CacheSettings {
        dispatch: DispatchSettings {
            worker_threads: 2,
            thread_name: thread_name.to_string(),
        },
        ..CacheSettings::default()
    }
}

pub fn shared_config(thread_name: &str) -> Arc<CacheConfiguration> {
    Arc::new(CacheConfiguration::new(test_settings(thread_name)).expect("test configuration"))
}
