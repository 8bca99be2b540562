//! Herald Library
//!
//! Notification dispatch to PagerDuty, Kodi/XBMC and Zulip, each configured
//! from a single URL.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, AppResult};
pub use models::{NotificationMessage, NotifyType};
pub use services::NotificationService;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
