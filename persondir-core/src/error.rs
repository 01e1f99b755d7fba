//! Error types for persondir.
//!
//! One error enum is shared by the decorator and the lookup services it wraps,
//! so a delegate failure reaches the caller unchanged.

use thiserror::Error;

/// Result type alias using `PersonDirError`.
pub type Result<T> = std::result::Result<T, PersonDirError>;

/// Main error type for all persondir operations.
#[derive(Debug, Error)]
pub enum PersonDirError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CALLER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Missing collaborator or unusable key policy.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller supplied an argument that cannot be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A lookup service failed to resolve a seed.
    #[error("Attribute lookup failed in '{source_name}': {reason}")]
    LookupFailed {
        /// Name of the failing service
        source_name: String,
        /// What went wrong
        reason: String,
    },

    /// The backing directory is unreadable or corrupt.
    #[error("Directory error: {0}")]
    DirectoryError(String),

    /// A record or seed failed validation.
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // I/O & SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PersonDirError {
    /// Shorthand for a [`PersonDirError::LookupFailed`].
    pub fn lookup_failed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        PersonDirError::LookupFailed {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is a configuration problem.
    ///
    /// Configuration errors are never worth retrying.
    pub fn is_config_error(&self) -> bool {
        matches!(self, PersonDirError::ConfigError(_))
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PersonDirError::LookupFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersonDirError::lookup_failed("ldap", "connection reset");
        assert!(err.to_string().contains("ldap"));
        assert!(err.to_string().contains("connection reset"));

        let err = PersonDirError::ConfigError("no cache store".into());
        assert_eq!(err.to_string(), "Configuration error: no cache store");
    }

    #[test]
    fn test_error_classification() {
        assert!(PersonDirError::ConfigError("x".into()).is_config_error());
        assert!(!PersonDirError::InvalidArgument("x".into()).is_config_error());

        assert!(PersonDirError::lookup_failed("ldap", "timeout").is_recoverable());
        assert!(!PersonDirError::ConfigError("x".into()).is_recoverable());
        assert!(!PersonDirError::DirectoryError("x".into()).is_recoverable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(PersonDirError::from);
        assert!(matches!(result, Err(PersonDirError::JsonError(_))));
    }
}
