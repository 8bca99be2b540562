//! Core notification provider traits and the context providers are built in.
//!
//! A provider is split into three capabilities so each concern can be
//! implemented and tested on its own:
//!
//! - [`FromNotifyUrl`] turns a parsed URL into validated options and a
//!   provider
//! - [`Notify`] delivers one message
//! - [`RenderUrl`] renders the provider back into a URL
//!
//! [`NotificationProvider`] is the object-safe union the registry hands out.

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::external::{ReqwestTransport, RequestOptions, Transport};
use crate::models::{AppAsset, NotifyType};
use crate::utils::url::NotifyUrl;
use async_trait::async_trait;
use std::sync::Arc;

use super::descriptor::ServiceDescriptor;

/// Shared collaborators every provider is constructed with
#[derive(Clone)]
pub struct ProviderContext {
    /// Network seam used for every POST
    pub transport: Arc<dyn Transport>,
    /// Application identity and image source
    pub asset: AppAsset,
    /// Defaults for `verify`, `rto` and `cto`
    pub request: RequestOptions,
    /// When false, providers never throttle
    pub throttle: bool,
}

impl ProviderContext {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            asset: AppAsset::default(),
            request: RequestOptions::default(),
            throttle: true,
        }
    }

    /// Build the production context from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::new()),
            asset: settings.application.asset(),
            request: settings.http.request_options(),
            throttle: settings.http.throttle,
        }
    }

    pub fn with_asset(mut self, asset: AppAsset) -> Self {
        self.asset = asset;
        self
    }

    pub fn with_request_options(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    pub fn with_throttle(mut self, enabled: bool) -> Self {
        self.throttle = enabled;
        self
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestTransport::new()))
    }
}

/// Delivery of a single message
///
/// Uses `async_trait` so providers can be used behind `dyn`. Delivery
/// failures are logged and reported as `false`, never as an error.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Sends a notification
    ///
    /// # Arguments
    /// * `body` - Message body
    /// * `title` - Message title, may be empty
    /// * `notify_type` - Severity class of the message
    ///
    /// # Returns
    /// `true` when every request the provider made was accepted
    async fn send(&self, body: &str, title: &str, notify_type: NotifyType) -> bool;
}

/// Rendering a provider back into its URL form
pub trait RenderUrl {
    /// Canonical URL; with `privacy` set, secrets are replaced by `****`
    fn url(&self, privacy: bool) -> String;

    /// Fields that identify the endpoint this provider talks to
    fn url_identifier(&self) -> Vec<String>;

    /// Number of distinct destinations a single `send` reaches
    fn target_count(&self) -> usize {
        1
    }
}

/// Construction of a provider from its URL
pub trait FromNotifyUrl: Sized {
    /// Parsed but not yet validated provider fields
    type Options;

    /// Static description of the service
    fn service() -> &'static ServiceDescriptor;

    /// Map a parsed URL onto provider options
    fn parse_url(url: &NotifyUrl) -> AppResult<Self::Options>;

    /// Validate options and build the provider
    fn from_options(options: Self::Options, context: &ProviderContext) -> AppResult<Self>;

    /// Parse options from an already split URL and build the provider
    fn from_notify_url(url: &NotifyUrl, context: &ProviderContext) -> AppResult<Self> {
        Self::from_options(Self::parse_url(url)?, context)
    }

    /// Parse `url` and build the provider
    fn from_url(url: &str, context: &ProviderContext) -> AppResult<Self> {
        let service = Self::service();
        let parsed = NotifyUrl::parse(url, service.verify_host)?;
        if !service.handles(&parsed.schema) {
            return Err(AppError::UnsupportedScheme {
                scheme: parsed.schema,
            });
        }
        Self::from_notify_url(&parsed, context)
    }
}

/// A fully built provider, usable behind `dyn`
pub trait NotificationProvider: Notify + RenderUrl {
    fn descriptor(&self) -> &'static ServiceDescriptor;

    /// Service name for logging
    fn name(&self) -> &'static str {
        self.descriptor().service_name
    }
}
