//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use crate::external::MAX_TIMEOUT_SECS;
use crate::utils::url::schema_of;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate a timeout in seconds: positive, finite, at most an hour
pub fn validate_timeout(secs_str: &str) -> Result<f64, String> {
    let secs: f64 = secs_str
        .trim()
        .parse()
        .map_err(|_| format!("Timeout must be a number of seconds, got: '{}'", secs_str))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err("Timeout must be greater than 0 seconds".to_string());
    }

    if secs > MAX_TIMEOUT_SECS {
        return Err(format!("Timeout cannot exceed {} seconds", MAX_TIMEOUT_SECS));
    }

    Ok(secs)
}

/// Check that a notification URL at least carries a schema
///
/// Provider-specific validation happens when the URL is built.
pub fn validate_notify_url(url_str: &str) -> Result<String, String> {
    let url = url_str.trim();

    if url.is_empty() {
        return Err("Notification URL cannot be empty".to_string());
    }

    if schema_of(url).is_none() {
        return Err(format!(
            "Notification URL must start with a schema such as kodi://, got: '{}'",
            url_str
        ));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_path_valid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[http]").unwrap();

        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), file.path());
    }

    #[test]
    fn test_config_file_path_invalid() {
        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());

        let dir = tempfile::tempdir().unwrap();
        let err = validate_config_file_path(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a file"));
    }

    #[test]
    fn test_timeout_validation_valid() {
        for (input, expected) in [("1", 1.0), ("0.5", 0.5), (" 30 ", 30.0), ("3600", 3600.0)] {
            assert_eq!(validate_timeout(input).unwrap(), expected, "input {}", input);
        }
    }

    #[test]
    fn test_timeout_validation_invalid() {
        for input in ["0", "-1", "abc", "", "inf", "NaN", "3601"] {
            assert!(validate_timeout(input).is_err(), "Timeout '{}' should be invalid", input);
        }
    }

    #[test]
    fn test_notify_url_validation() {
        assert_eq!(
            validate_notify_url("  kodi://media.local ").unwrap(),
            "kodi://media.local"
        );
        assert!(validate_notify_url("pagerduty://ik@key").is_ok());

        for input in ["", "   ", "media.local", "://host", "http:/host"] {
            assert!(validate_notify_url(input).is_err(), "URL '{}' should be invalid", input);
        }
    }
}
