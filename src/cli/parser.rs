//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::NotifyType;

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// Send notifications to PagerDuty, Kodi and Zulip from one URL each
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Send notifications to PagerDuty, Kodi and Zulip from one URL each")]
#[command(long_about = "
Herald delivers a message to every notification URL it is given. Each URL
names the service through its schema and carries the credentials and options
that service needs, so no per-service configuration file is required.

SUPPORTED SCHEMAS:
    pagerduty://  PagerDuty Events API v2
    kodi:// kodis:// xbmc:// xbmcs://  Kodi / XBMC on-screen notifications
    zulip://  Zulip stream and private messages

EXAMPLES:
    # Trigger a PagerDuty incident
    herald send -u 'pagerduty://integration@apikey/db01/disk' -b 'Disk almost full' --type failure

    # Notify Kodi and a Zulip stream at once
    herald send -u kodi://media.local -u 'zulip://alerts@acme/TOKEN/ops' -b 'Backup done' -t Backup

    # Show a URL with its secrets hidden
    herald render -u 'zulip://alerts@acme/TOKEN/ops' --privacy

    # Validate URLs without sending anything
    herald check -u kodi://media.local:9090

    # List supported services
    herald check --list

Exit status is 0 when every notification was delivered and 1 otherwise.
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load settings from this TOML file instead of the layered
    /// configuration directory. The file must exist and be readable.
    ///
    /// Example: --config /etc/herald/herald.toml
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    ///
    /// Available values: development (dev), test, staging (stage), production (prod)
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Logs request URLs and payloads at debug level.
    /// Cannot be used with --quiet.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Cannot be used with --verbose.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Skip TLS certificate verification
    ///
    /// Applies to every URL that does not set `verify=` itself.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    ///
    /// Applies to every URL that does not set `rto=` itself.
    #[arg(long, global = true, value_name = "SECS", value_parser = super::validation::validate_timeout)]
    pub timeout: Option<f64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification to one or more URLs
    ///
    /// Every URL is validated before anything is sent; one invalid URL
    /// aborts the whole run.
    ///
    /// Examples:
    ///   herald send -u kodi://media.local -b 'Hello'
    ///   herald send -u 'pagerduty://ik@key' -b 'Down' -t 'web01' --type failure
    Send {
        /// Notification URL (repeatable)
        #[arg(short, long = "url", value_name = "URL", required = true, value_parser = super::validation::validate_notify_url)]
        urls: Vec<String>,

        /// Message body
        #[arg(short, long, value_name = "TEXT")]
        body: String,

        /// Message title
        #[arg(short, long, value_name = "TEXT", default_value = "")]
        title: String,

        /// Notification type, mapped onto each service's own levels
        #[arg(long = "type", value_enum, default_value = "info")]
        notify_type: MessageType,
    },
    /// Print the canonical form of a notification URL
    ///
    /// Examples:
    ///   herald render -u 'pagerduty://ik@key/source'
    ///   herald render -u 'zulip://bot@org/TOKEN' --privacy
    Render {
        /// Notification URL
        #[arg(short, long, value_name = "URL", value_parser = super::validation::validate_notify_url)]
        url: String,

        /// Replace secrets with asterisks
        #[arg(short, long)]
        privacy: bool,
    },
    /// Validate notification URLs without sending anything
    ///
    /// Examples:
    ///   herald check -u kodi://media.local -u 'zulip://bot@org/TOKEN'
    ///   herald check --list
    Check {
        /// Notification URL (repeatable)
        #[arg(short, long = "url", value_name = "URL", required_unless_present = "list")]
        urls: Vec<String>,

        /// List the supported services and their schemas
        #[arg(short, long)]
        list: bool,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Notification type options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    #[value(name = "info")]
    Info,
    #[value(name = "success")]
    Success,
    #[value(name = "warning", alias = "warn")]
    Warning,
    #[value(name = "failure", alias = "fail")]
    Failure,
}

impl From<MessageType> for NotifyType {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Info => NotifyType::Info,
            MessageType::Success => NotifyType::Success,
            MessageType::Warning => NotifyType::Warning,
            MessageType::Failure => NotifyType::Failure,
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
