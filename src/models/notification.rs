//! Notification models shared by every provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

// ============================================================================
// Enums
// ============================================================================

/// Generic severity of a notification, mapped by each provider onto its own
/// levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyType {
    #[default]
    Info,
    Success,
    Warning,
    Failure,
}

impl NotifyType {
    pub const ALL: [NotifyType; 4] = [
        NotifyType::Info,
        NotifyType::Success,
        NotifyType::Warning,
        NotifyType::Failure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyType::Info => "info",
            NotifyType::Success => "success",
            NotifyType::Warning => "warning",
            NotifyType::Failure => "failure",
        }
    }
}

impl fmt::Display for NotifyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(NotifyType::Info),
            "success" => Ok(NotifyType::Success),
            "warning" => Ok(NotifyType::Warning),
            "failure" => Ok(NotifyType::Failure),
            _ => Err(AppError::validation(
                "notify_type",
                s,
                "expected one of: info, success, warning, failure",
            )),
        }
    }
}

/// Dimensions of the notification icon requested from the asset store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Xy32,
    Xy72,
    Xy128,
    Xy256,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Xy32 => "32x32",
            ImageSize::Xy72 => "72x72",
            ImageSize::Xy128 => "128x128",
            ImageSize::Xy256 => "256x256",
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Message to be delivered by one or more providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Message title; may be empty
    #[serde(default)]
    pub title: String,
    /// Message body (required)
    pub body: String,
    #[serde(default)]
    pub notify_type: NotifyType,
}

impl NotificationMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            body: body.into(),
            notify_type: NotifyType::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_type(mut self, notify_type: NotifyType) -> Self {
        self.notify_type = notify_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_type_from_str() {
        assert_eq!("info".parse::<NotifyType>().unwrap(), NotifyType::Info);
        assert_eq!("SUCCESS".parse::<NotifyType>().unwrap(), NotifyType::Success);
        assert_eq!(" warning ".parse::<NotifyType>().unwrap(), NotifyType::Warning);
        assert_eq!("failure".parse::<NotifyType>().unwrap(), NotifyType::Failure);
        assert!("fatal".parse::<NotifyType>().is_err());
    }

    #[test]
    fn test_notify_type_display_round_trips() {
        for notify_type in NotifyType::ALL {
            assert_eq!(notify_type.to_string().parse::<NotifyType>().unwrap(), notify_type);
        }
    }

    #[test]
    fn test_message_builder() {
        let message = NotificationMessage::new("disk full")
            .with_title("node1")
            .with_type(NotifyType::Failure);
        assert_eq!(message.title, "node1");
        assert_eq!(message.body, "disk full");
        assert_eq!(message.notify_type, NotifyType::Failure);
    }

    #[test]
    fn test_message_deserializes_with_defaults() {
        let message: NotificationMessage = serde_json::from_str(r#"{"body":"hello"}"#).unwrap();
        assert_eq!(message.title, "");
        assert_eq!(message.notify_type, NotifyType::Info);
    }
}
