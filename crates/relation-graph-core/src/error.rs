//! Error types for relation-graph-core.
//!
//! Defines the central [`CoreError`] type and the [`CoreResult<T>`] alias
//! used throughout the core crate. Configuration problems are recoverable
//! (callers fall back to defaults); validation problems are not.

use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration source is malformed or missing a required value.
    ///
    /// Callers that can proceed with built-in defaults should log this
    /// and continue rather than aborting.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A field value failed validation constraints.
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// A rule file could not be parsed.
    #[error("Rule error: {0}")]
    RuleError(String),

    /// Error during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::RuleError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::ValidationError {
            field: "confidence".into(),
            message: "must be within [0, 1]".into(),
        };
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn test_config_error_from_toml() {
        let err: CoreError = toml::from_str::<toml::Value>("not [valid").unwrap_err().into();
        assert!(matches!(err, CoreError::RuleError(_)));
    }
}
