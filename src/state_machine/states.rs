use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScsError;

/// Policy deciding whether a cache store recomputes or reuses stale entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[non_exhaustive]
pub enum CacheMode {
    /// Stale entries are recomputed on access
    Rebuild,
}

impl CacheMode {
    /// Every mode the core currently accepts
    pub const ALL: &'static [CacheMode] = &[CacheMode::Rebuild];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rebuild => "rebuild",
        }
    }

    /// Check if entries must be recomputed rather than reused
    pub fn recomputes_stale_entries(&self) -> bool {
        matches!(self, Self::Rebuild)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheMode {
    type Err = ScsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebuild" => Ok(Self::Rebuild),
            _ => Err(ScsError::invalid_value(
                "cache_mode",
                s,
                format!(
                    "unrecognized cache mode, expected one of: {}",
                    Self::ALL
                        .iter()
                        .map(CacheMode::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

/// Settings files and environment variables parse modes through `FromStr`
impl TryFrom<String> for CacheMode {
    type Error = ScsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Initial mode of every configuration
impl Default for CacheMode {
    fn default() -> Self {
        Self::Rebuild
    }
}
