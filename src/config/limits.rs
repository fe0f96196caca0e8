//! Interpretation of the raw cache limit.
//!
//! A stored limit of `0` is ambiguous: it can mean "no bound" or "caching
//! disabled". The core never picks one; the cache store passes a
//! [`ZeroLimitPolicy`] whenever it needs an effective bound.

use serde::{Deserialize, Serialize};

/// How a cache store reads a limit of zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroLimitPolicy {
    Unbounded,
    Disabled,
}

/// Effective entry bound after applying a [`ZeroLimitPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitBound {
    Unbounded,
    Disabled,
    Entries(u64),
}

impl LimitBound {
    /// Resolve a validated (non-negative) raw limit
    pub fn resolve(raw_limit: u64, policy: ZeroLimitPolicy) -> Self {
        match (raw_limit, policy) {
            (0, ZeroLimitPolicy::Unbounded) => Self::Unbounded,
            (0, ZeroLimitPolicy::Disabled) => Self::Disabled,
            (n, _) => Self::Entries(n),
        }
    }

    /// Check whether a store holding `entries` items may accept one more
    pub fn admits(&self, entries: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Disabled => false,
            Self::Entries(max) => entries < *max,
        }
    }
}
