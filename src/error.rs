use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScsError {
    #[error("Invalid configuration for '{field}' (value: {value}): {reason}")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Dispatch unavailable: {0}")]
    DispatchUnavailable(String),
    #[error("Configuration load error: {0}")]
    ConfigurationLoad(String),
}

impl ScsError {
    /// Create an invalid configuration error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dispatch_unavailable(reason: impl Into<String>) -> Self {
        Self::DispatchUnavailable(reason.into())
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

impl From<::config::ConfigError> for ScsError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::ConfigurationLoad(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScsError>;
