use thiserror::Error;

use crate::config::error::ConfigError;

/// Library-wide error type.
///
/// Only configuration-time failures are represented here. Delivery failures
/// never surface as errors: `send` reports them as `false` and logs the cause.
#[derive(Error, Debug)]
pub enum AppError {
    /// The notification URL could not be split into its parts
    #[error("Invalid notification URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No provider is registered for the URL schema
    #[error("Unsupported notification schema: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// A provider field failed validation during construction
    #[error("invalid `{field}` specified: `{value}` ({reason})")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a construction-time validation failure
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AppError::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a URL that could not be parsed
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
