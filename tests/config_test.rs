//! Configuration accessor tests

mod common;

use common::shared_config;
use proptest::prelude::*;
use scs_core::{CacheMode, ScsError, DEBUG_IDENTIFIER, DEFAULT_LABEL};

#[test]
fn fresh_configuration_has_expected_defaults() {
    let config = shared_config("scs-defaults");

    assert_eq!(config.cache_limit(), 0);
    assert_eq!(config.cache_mode(), CacheMode::Rebuild);
    assert!(!config.is_debug_enabled());
    assert_eq!(config.log_file_path(), "scserror.log");
}

#[test]
fn fixed_labels_never_change() {
    let config = shared_config("scs-labels");

    for _ in 0..3 {
        assert_eq!(config.default_label(), "default");
        assert_eq!(config.debug_prefix(), "[SCS]");
    }
    config.set_debug_enabled(true);
    config.set_cache_limit(99).unwrap();
    assert_eq!(config.default_label(), DEFAULT_LABEL);
    assert_eq!(config.debug_prefix(), DEBUG_IDENTIFIER);
}

#[test]
fn mutations_are_visible_to_other_holders() {
    let config = shared_config("scs-holders");
    let other = config.clone();

    config.set_debug_enabled(true);
    config.set_log_file_path("logs/cache.log").unwrap();

    assert!(other.is_debug_enabled());
    assert_eq!(other.log_file_path(), "logs/cache.log");
    assert_eq!(other.generation(), 2);
}

#[test]
fn invalid_mode_name_leaves_mode_unchanged() {
    let config = shared_config("scs-mode");

    let err = config.set_cache_mode_str("reuse").unwrap_err();
    assert!(matches!(
        err,
        ScsError::InvalidConfiguration { ref field, .. } if field == "cache_mode"
    ));
    assert_eq!(config.cache_mode(), CacheMode::Rebuild);
}

#[test]
fn isolated_instances_do_not_share_state() {
    let first = shared_config("scs-isolated-a");
    let second = shared_config("scs-isolated-b");

    first.set_cache_limit(10).unwrap();
    assert_eq!(second.cache_limit(), 0);
}

proptest! {
    /// Property: any accepted limit reads back unchanged
    #[test]
    fn cache_limit_round_trips(limit in 0i64..=i64::MAX) {
        let config = shared_config("scs-prop-limit");
        config.set_cache_limit(limit).unwrap();
        prop_assert_eq!(config.cache_limit(), limit);
    }

    /// Property: negative limits are rejected without touching the stored value
    #[test]
    fn negative_cache_limit_rejected(start in 0i64..1_000_000, limit in i64::MIN..0) {
        let config = shared_config("scs-prop-negative");
        config.set_cache_limit(start).unwrap();
        prop_assert!(config.set_cache_limit(limit).is_err());
        prop_assert_eq!(config.cache_limit(), start);
    }
}
