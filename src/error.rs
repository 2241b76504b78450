//! Error types for geocode-throttle
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! A provider response carrying `OVER_QUERY_LIMIT` is *not* an error: it is
//! returned as a regular response after the client has cooled down.

use thiserror::Error;

/// The main error type for geocode-throttle
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Call Errors
    // ============================================================================
    #[error("Request cancelled")]
    Cancelled,

    #[error("Signing failed: {message}")]
    Signing { message: String },

    /// Failure reported by the injected transport, passed through untouched
    #[error(transparent)]
    Transport(anyhow::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Check if this error was raised while constructing a client
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::InvalidUrl(_)
        )
    }

    /// Check if this error is a caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Result type alias for geocode-throttle
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("transport");
        assert_eq!(err.to_string(), "Missing required config field: transport");

        let err = Error::invalid_value("requests_per_second", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'requests_per_second': must be positive"
        );

        assert_eq!(Error::Cancelled.to_string(), "Request cancelled");
    }

    #[test]
    fn test_transport_error_is_verbatim() {
        let err = Error::Transport(anyhow::anyhow!("connection reset by peer"));
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("x").is_config());
        assert!(Error::missing_field("credentials").is_config());
        assert!(Error::invalid_value("base_url", "empty").is_config());

        assert!(!Error::Cancelled.is_config());
        assert!(!Error::signing("bad key").is_config());
        assert!(!Error::Transport(anyhow::anyhow!("boom")).is_config());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::signing("bad key").is_cancelled());
    }
}
