//! Errors raised while loading and validating herald settings

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file that must exist does not
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Sources were read but could not be deserialized into `Settings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A setting holds a value outside its accepted range
    #[error("Invalid setting `{field}`: {message}")]
    ValidationError { field: String, message: String },

    /// `HERALD_APP_ENV` or a related variable is malformed
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Two sources that cannot be combined were both requested
    #[error("Conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    /// Raised by the `config` crate while merging sources
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}
