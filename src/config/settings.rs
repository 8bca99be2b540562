//! Configuration settings structures for herald
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::external::RequestOptions;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
use crate::models::AppAsset;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_id() -> String {
    "Herald".to_string()
}

fn default_app_desc() -> String {
    "Herald Notifications".to_string()
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> f64 {
    4.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/herald.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Identity presented to remote services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Sent as `User-Agent` and as the PagerDuty client name
    #[serde(default = "default_app_id")]
    pub app_id: String,

    #[serde(default = "default_app_desc")]
    pub app_desc: String,

    /// Icon URL template with `{THEME}`, `{TYPE}` and `{XY}` placeholders;
    /// empty disables images
    #[serde(default)]
    pub image_url_mask: String,

    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            app_desc: default_app_desc(),
            image_url_mask: String::new(),
            theme: default_theme(),
        }
    }
}

impl ApplicationConfig {
    /// Asset handed to providers
    pub fn asset(&self) -> AppAsset {
        AppAsset {
            app_id: self.app_id.clone(),
            app_desc: self.app_desc.clone(),
            image_url_mask: self.image_url_mask.clone(),
            theme: self.theme.clone(),
        }
    }
}

// ============================================================================
// HTTP Configuration
// ============================================================================

/// Defaults for outbound requests; URLs override them with `verify`, `rto`
/// and `cto`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_true")]
    pub verify_certificate: bool,

    /// Seconds allowed for a whole request
    #[serde(default = "default_timeout_secs")]
    pub request_timeout: f64,

    /// Seconds allowed to establish a connection
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout: f64,

    /// Space requests to each service according to its rate limit
    #[serde(default = "default_true")]
    pub throttle: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            request_timeout: default_timeout_secs(),
            connect_timeout: default_timeout_secs(),
            throttle: true,
        }
    }
}

impl HttpConfig {
    /// Request defaults for providers
    ///
    /// Call after [`HttpConfig::validate`]; unusable timeouts fall back to
    /// the built-in default.
    pub fn request_options(&self) -> RequestOptions {
        let defaults = RequestOptions::default();
        RequestOptions {
            verify_certificate: self.verify_certificate,
            request_timeout: seconds(self.request_timeout).unwrap_or(defaults.request_timeout),
            connect_timeout: seconds(self.connect_timeout).unwrap_or(defaults.connect_timeout),
        }
    }
}

fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value > 0.0).then(|| Duration::from_secs_f64(value))
}

// ============================================================================
// Logger Configuration
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl ConsoleSettings {
    /// Convert ConsoleSettings to ConsoleConfig
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }

    /// Parse the format string into LogFormat enum
    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Application identity
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Outbound request defaults
    #[serde(default)]
    pub http: HttpConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Arbitrary implementations for property-based testing
    // ========================================================================

    fn arb_application_config() -> impl Strategy<Value = ApplicationConfig> {
        (
            "[A-Za-z][A-Za-z0-9-]{0,20}",
            "[A-Za-z][A-Za-z0-9 ]{0,30}",
            prop_oneof![
                Just(String::new()),
                Just("https://cdn.example.com/{THEME}/{TYPE}-{XY}.png".to_string()),
            ],
            "[a-z]{1,10}",
        )
            .prop_map(|(app_id, app_desc, image_url_mask, theme)| ApplicationConfig {
                app_id,
                app_desc,
                image_url_mask,
                theme,
            })
    }

    fn arb_http_config() -> impl Strategy<Value = HttpConfig> {
        (any::<bool>(), 1u32..=120u32, 1u32..=120u32, any::<bool>()).prop_map(
            |(verify_certificate, request_timeout, connect_timeout, throttle)| HttpConfig {
                verify_certificate,
                // Quarter seconds survive the TOML float round trip exactly
                request_timeout: f64::from(request_timeout) / 4.0,
                connect_timeout: f64::from(connect_timeout) / 4.0,
                throttle,
            },
        )
    }

    fn arb_console_settings() -> impl Strategy<Value = ConsoleSettings> {
        (any::<bool>(), any::<bool>())
            .prop_map(|(enabled, colored)| ConsoleSettings { enabled, colored })
    }

    fn arb_file_settings() -> impl Strategy<Value = FileSettings> {
        (
            any::<bool>(), // enabled
            prop_oneof![
                Just("logs/herald.log".to_string()),
                Just("logs/test.log".to_string()),
                Just("/var/log/herald.log".to_string()),
            ],
            any::<bool>(), // append
            prop_oneof![
                Just("json".to_string()),
                Just("full".to_string()),
                Just("compact".to_string()),
            ],
        )
            .prop_map(|(enabled, path, append, format)| FileSettings {
                enabled,
                path,
                append,
                format,
            })
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            arb_console_settings(),
            arb_file_settings(),
        )
            .prop_map(|(level, console, file)| LoggerSettings {
                level,
                console,
                file,
            })
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_application_config(),
            arb_http_config(),
            arb_logger_settings(),
        )
            .prop_map(|(application, http, logger)| Settings {
                application,
                http,
                logger,
            })
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any valid Settings to TOML and back yields the same
        /// Settings.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");

            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");

            prop_assert_eq!(settings, deserialized);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.app_id, "Herald");
        assert_eq!(config.app_desc, "Herald Notifications");
        assert!(config.image_url_mask.is_empty());
        assert_eq!(config.asset(), AppAsset::default());
    }

    #[test]
    fn test_http_config_request_options() {
        let config = HttpConfig {
            verify_certificate: false,
            request_timeout: 2.5,
            connect_timeout: 0.0,
            throttle: true,
        };

        let options = config.request_options();
        assert!(!options.verify_certificate);
        assert_eq!(options.request_timeout, Duration::from_millis(2500));
        assert_eq!(options.connect_timeout, Duration::from_secs(4));

        assert_eq!(HttpConfig::default().request_options(), RequestOptions::default());
    }

    #[test]
    fn test_logger_settings_defaults() {
        let settings = LoggerSettings::default();
        assert_eq!(settings.level, "info");
        assert!(settings.console.enabled);
        assert!(!settings.file.enabled);
        assert_eq!(settings.file.format, "json");
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let settings: Settings = toml::from_str(
            r#"
[application]
app_id = "ops-bot"

[http]
request_timeout = 10
"#,
        )
        .expect("partial TOML should deserialize");

        assert_eq!(settings.application.app_id, "ops-bot");
        assert_eq!(settings.application.theme, "default");
        assert_eq!(settings.http.request_timeout, 10.0);
        assert_eq!(settings.http.connect_timeout, 4.0);
        assert!(settings.http.throttle);
        assert_eq!(settings.logger, LoggerSettings::default());
    }

    #[test]
    fn test_settings_deserialize_empty() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_settings_into_file_config_all_formats() {
        for (format, expected) in [
            ("full", LogFormat::Full),
            ("compact", LogFormat::Compact),
            ("JSON", LogFormat::Json),
        ] {
            let settings = FileSettings {
                format: format.to_string(),
                ..Default::default()
            };
            assert_eq!(settings.into_file_config().unwrap().format, expected);
        }
    }

    #[test]
    fn test_file_settings_into_file_config_invalid_format() {
        let settings = FileSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        let err = settings.into_file_config().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "logger.file.format"));
    }

    #[test]
    fn test_logger_settings_into_logger_config_with_file() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/custom.log".to_string(),
                append: false,
                format: "compact".to_string(),
            },
        };

        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.level, "debug");
        assert!(!config.console.enabled);
        assert!(config.file.enabled);
        assert_eq!(config.file.path, PathBuf::from("logs/custom.log"));
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_logger_settings_into_logger_config_both_disabled() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert!(settings.into_logger_config().is_err());
    }
}
