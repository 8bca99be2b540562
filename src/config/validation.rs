//! Configuration validation
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::external::MAX_TIMEOUT_SECS;
use crate::config::settings::{
    ApplicationConfig, FileSettings, HttpConfig, LoggerSettings, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];


impl ApplicationConfig {
    /// Validate application identity
    ///
    /// # Validation Rules
    /// - `app_id` must not be blank
    /// - A non-empty image mask must be an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::validation(
                "application.app_id",
                "Application id is required; it is sent as the User-Agent.",
            ));
        }

        let mask = self.image_url_mask.trim();
        if !mask.is_empty() && !(mask.starts_with("http://") || mask.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                field: "application.image_url_mask".to_string(),
                message: format!(
                    "Image URL mask '{}' must start with http:// or https://",
                    self.image_url_mask
                ),
            });
        }

        Ok(())
    }
}

impl HttpConfig {
    /// Validate outbound request defaults
    ///
    /// # Validation Rules
    /// - Both timeouts must be finite, greater than 0 and at most one hour
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout("http.request_timeout", self.request_timeout)?;
        validate_timeout("http.connect_timeout", self.connect_timeout)?;
        Ok(())
    }
}

fn validate_timeout(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 || value > MAX_TIMEOUT_SECS {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!(
                "Timeout must be greater than 0 and at most {} seconds, got {}.",
                MAX_TIMEOUT_SECS, value
            ),
        });
    }
    Ok(())
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.application.validate()?;
        self.http.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
