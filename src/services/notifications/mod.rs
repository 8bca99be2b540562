//! Notification system with pluggable providers.
//!
//! Each provider wraps one third-party service and is configured by a URL.
//! The [`ProviderRegistry`] maps URL schemas to providers and the
//! [`NotificationService`] fans a message out to a list of URLs.

mod dispatch;
mod throttle;

pub mod descriptor;
pub mod kodi_provider;
pub mod notification_service;
pub mod pagerduty_provider;
pub mod provider;
pub mod registry;
pub mod zulip_provider;

#[cfg(test)]
pub(crate) mod testing;

pub use descriptor::{ServiceDescriptor, ServiceLimits};
pub use dispatch::RequestOverrides;
pub use kodi_provider::KodiProvider;
pub use notification_service::NotificationService;
pub use pagerduty_provider::PagerDutyProvider;
pub use provider::{FromNotifyUrl, NotificationProvider, Notify, ProviderContext, RenderUrl};
pub use registry::ProviderRegistry;
pub use throttle::Throttle;
pub use zulip_provider::ZulipProvider;
