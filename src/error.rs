//! Error types for the analyst core.
//!
//! Every failure on the validate → execute path maps to one of these
//! variants so callers can render a category and pick remediation hints.

use thiserror::Error;

/// Main error type for analyst operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalystError {
    /// SQL rejected before execution (statement type, forbidden keyword, malformed CTE).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed connection configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Query exceeded the execution time bound.
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Any other failure raised by the database driver.
    #[error("Driver error: {0}")]
    Driver(String),

    /// Chart payload embedded in text could not be decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalystError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a timeout error with the given message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a driver error with the given message.
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Creates an encoding error with the given message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Configuration(_) => "Configuration Error",
            Self::Timeout(_) => "Timeout Error",
            Self::Driver(_) => "Driver Error",
            Self::Encoding(_) => "Encoding Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Configuration(m)
            | Self::Timeout(m)
            | Self::Driver(m)
            | Self::Encoding(m)
            | Self::Internal(m) => m,
        }
    }
}

/// Result type alias using AnalystError.
pub type Result<T> = std::result::Result<T, AnalystError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = AnalystError::validation("Query contains forbidden keyword 'drop'");
        assert_eq!(
            err.to_string(),
            "Validation error: Query contains forbidden keyword 'drop'"
        );
        assert_eq!(err.category(), "Validation Error");
    }

    #[test]
    fn test_error_display_configuration() {
        let err = AnalystError::configuration("DATABASE_URL is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: DATABASE_URL is not set"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = AnalystError::timeout("Query timed out after 30 seconds");
        assert_eq!(
            err.to_string(),
            "Timeout error: Query timed out after 30 seconds"
        );
        assert_eq!(err.category(), "Timeout Error");
    }

    #[test]
    fn test_error_display_driver() {
        let err = AnalystError::driver("relation \"acounts\" does not exist");
        assert_eq!(
            err.to_string(),
            "Driver error: relation \"acounts\" does not exist"
        );
        assert_eq!(err.category(), "Driver Error");
    }

    #[test]
    fn test_error_message_strips_category() {
        let err = AnalystError::encoding("expected value at line 1 column 1");
        assert_eq!(err.message(), "expected value at line 1 column 1");
        assert_eq!(err.category(), "Encoding Error");
        assert_eq!(AnalystError::internal("boom").message(), "boom");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalystError>();
    }
}
