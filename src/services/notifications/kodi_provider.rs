//! Kodi and XBMC notification provider implementation.
//!
//! Shows an on-screen notification through the JSON-RPC `GUI.ShowNotification`
//! method. `xbmc://` speaks the v2 protocol, `kodi://` the v6 one; an `s`
//! suffix switches to HTTPS.
//!
//! JSON-RPC Reference: https://kodi.wiki/view/JSON-RPC_API

use async_trait::async_trait;
use serde_json::json;

use super::descriptor::{ServiceDescriptor, ServiceLimits};
use super::dispatch::{Dispatcher, RequestOverrides};
use super::provider::{FromNotifyUrl, NotificationProvider, Notify, ProviderContext, RenderUrl};
use crate::error::{AppError, AppResult};
use crate::external::HttpRequest;
use crate::models::{AppAsset, ImageSize, NotifyType};
use crate::utils::parse::parse_bool;
use crate::utils::url::{NotifyUrl, pprint_secret, quote, render_query};

/// Seconds a notification stays on screen unless configured
pub const DEFAULT_DURATION_SECS: u64 = 12;

/// Longest display time whose millisecond value fits Kodi's 32-bit `displaytime`
pub const MAX_DURATION_SECS: u64 = u32::MAX as u64 / 1000;

const DEFAULT_PLAIN_PORT: u16 = 8080;
const DEFAULT_SECURE_PORT: u16 = 443;

pub static DESCRIPTOR: ServiceDescriptor = ServiceDescriptor {
    service_name: "Kodi/XBMC",
    service_url: "https://kodi.tv/",
    setup_url: "https://kodi.wiki/view/JSON-RPC_API",
    protocols: &["xbmc", "kodi"],
    secure_protocols: &["xbmcs", "kodis"],
    templates: &[
        "{schema}://{host}",
        "{schema}://{host}:{port}",
        "{schema}://{user}:{password}@{host}",
        "{schema}://{user}:{password}@{host}:{port}",
    ],
    verify_host: true,
    limits: ServiceLimits {
        body_max_line_count: Some(2),
        ..ServiceLimits::DEFAULT
    },
    // Media centres sit on the local network
    request_rate_per_sec: 0.0,
    image_size: Some(ImageSize::Xy128),
    accepted_status: &[200],
    status_overrides: &[],
};

/// JSON-RPC dialect spoken by the media centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KodiProtocol {
    /// XBMC, JSON-RPC v2
    Xbmc,
    /// Kodi, JSON-RPC v6
    Kodi,
}

impl KodiProtocol {
    pub fn version(&self) -> u8 {
        match self {
            KodiProtocol::Xbmc => 2,
            KodiProtocol::Kodi => 6,
        }
    }

    fn schema(&self) -> &'static str {
        match self {
            KodiProtocol::Xbmc => "xbmc",
            KodiProtocol::Kodi => "kodi",
        }
    }
}

/// Fields read from a `kodi://` or `xbmc://` URL
#[derive(Debug, Clone, PartialEq)]
pub struct KodiOptions {
    pub schema: String,
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_image: bool,
    /// Display time in seconds; `None` or zero uses the default
    pub duration: Option<u64>,
    pub request: RequestOverrides,
}

/// Validated Kodi settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KodiConfig {
    pub host: String,
    /// Explicit port; never equal to the default for the security mode
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub secure: bool,
    pub protocol: KodiProtocol,
    pub duration: u64,
    pub include_image: bool,
}

impl KodiConfig {
    pub fn from_options(options: KodiOptions) -> AppResult<Self> {
        let schema = options.schema.to_lowercase();
        if !DESCRIPTOR.handles(&schema) {
            return Err(AppError::validation(
                "schema",
                options.schema,
                "expected one of: xbmc, xbmcs, kodi, kodis",
            ));
        }

        let host = options.host.trim().to_string();
        if host.is_empty() {
            return Err(AppError::validation("host", options.host, "a host is required"));
        }

        let protocol = if schema.starts_with("xbmc") {
            KodiProtocol::Xbmc
        } else {
            KodiProtocol::Kodi
        };
        let secure = DESCRIPTOR.is_secure_schema(&schema);
        let default_port = default_port(secure);

        let duration = options
            .duration
            .filter(|duration| *duration > 0)
            .unwrap_or(DEFAULT_DURATION_SECS);
        if duration > MAX_DURATION_SECS {
            return Err(AppError::validation(
                "duration",
                duration.to_string(),
                format!("must be at most {} seconds", MAX_DURATION_SECS),
            ));
        }

        Ok(Self {
            host,
            port: options.port.filter(|port| *port != default_port),
            user: options.user.filter(|user| !user.is_empty()),
            password: options.password,
            secure,
            protocol,
            duration,
            include_image: options.include_image,
        })
    }

    pub fn schema(&self) -> String {
        let base = self.protocol.schema();
        if self.secure {
            format!("{}s", base)
        } else {
            base.to_string()
        }
    }

    /// Port actually connected to
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| default_port(self.secure))
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}/jsonrpc",
            if self.secure { "https" } else { "http" },
            self.host,
            self.effective_port()
        )
    }
}

fn default_port(secure: bool) -> u16 {
    if secure {
        DEFAULT_SECURE_PORT
    } else {
        DEFAULT_PLAIN_PORT
    }
}

/// Kodi/XBMC notification provider
pub struct KodiProvider {
    config: KodiConfig,
    asset: AppAsset,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for KodiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KodiProvider")
            .field("config", &self.config)
            .field("asset", &self.asset)
            .finish_non_exhaustive()
    }
}

impl KodiProvider {
    pub fn new(options: KodiOptions, context: &ProviderContext) -> AppResult<Self> {
        let request = options.request;
        let config = KodiConfig::from_options(options)?;

        Ok(Self {
            config,
            asset: context.asset.clone(),
            dispatcher: Dispatcher::new(&DESCRIPTOR, context, request),
        })
    }

    pub fn config(&self) -> &KodiConfig {
        &self.config
    }

    /// Builds the JSON-RPC envelope for the configured protocol
    fn build_payload(&self, title: &str, body: &str, notify_type: NotifyType) -> serde_json::Value {
        let mut payload = json!({
            "jsonrpc": "2.0",
            "method": "GUI.ShowNotification",
            "params": {
                "title": title,
                "message": body,
                "displaytime": self.config.duration * 1000,
            },
            "id": 1,
        });

        let image_url = if self.config.include_image {
            DESCRIPTOR.image_url(&self.asset, notify_type)
        } else {
            None
        };

        if let Some(image_url) = image_url {
            payload["params"]["image"] = json!(image_url);

            if self.config.protocol == KodiProtocol::Kodi {
                payload["type"] = json!(match notify_type {
                    NotifyType::Failure => "error",
                    NotifyType::Warning => "warning",
                    NotifyType::Info | NotifyType::Success => "info",
                });
            }
        }

        payload
    }
}

impl FromNotifyUrl for KodiProvider {
    type Options = KodiOptions;

    fn service() -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }

    fn parse_url(url: &NotifyUrl) -> AppResult<KodiOptions> {
        Ok(KodiOptions {
            schema: url.schema.clone(),
            host: url.host.clone(),
            port: url.port,
            user: url.user.clone(),
            password: url.password.clone(),
            include_image: url
                .query("image")
                .map(|value| parse_bool(value, true))
                .unwrap_or(true),
            duration: url
                .query("duration")
                .and_then(|value| value.trim().parse::<i64>().ok())
                .map(i64::unsigned_abs),
            request: RequestOverrides::from_url(url),
        })
    }

    fn from_options(options: KodiOptions, context: &ProviderContext) -> AppResult<Self> {
        Self::new(options, context)
    }
}

#[async_trait]
impl Notify for KodiProvider {
    async fn send(&self, body: &str, title: &str, notify_type: NotifyType) -> bool {
        let (title, body) = DESCRIPTOR.limits.apply(title, body);
        let payload = self.build_payload(&title, &body, notify_type);

        let mut request = HttpRequest::post(self.config.endpoint(), payload.to_string())
            .header("User-Agent", self.asset.app_id.as_str())
            .header("Content-Type", "application/json");

        if let Some(user) = &self.config.user {
            request = request.basic_auth(user.as_str(), self.config.password.clone());
        }

        self.dispatcher.post(&self.config.host, request).await
    }
}

impl RenderUrl for KodiProvider {
    fn url(&self, privacy: bool) -> String {
        let mut params = vec![
            (
                "image".to_string(),
                if self.config.include_image { "yes" } else { "no" }.to_string(),
            ),
            ("duration".to_string(), self.config.duration.to_string()),
        ];
        params.extend(self.dispatcher.url_parameters());

        let auth = match (&self.config.user, &self.config.password) {
            (Some(user), Some(password)) => {
                format!("{}:{}@", quote(user), pprint_secret(password, privacy))
            }
            (Some(user), None) => format!("{}@", quote(user)),
            _ => String::new(),
        };

        let port = self
            .config
            .port
            .map(|port| format!(":{}", port))
            .unwrap_or_default();

        format!(
            "{}://{}{}{}/{}",
            self.config.schema(),
            auth,
            self.config.host,
            port,
            render_query(&params)
        )
    }

    fn url_identifier(&self) -> Vec<String> {
        vec![
            self.config.schema(),
            self.config.user.clone().unwrap_or_default(),
            self.config.password.clone().unwrap_or_default(),
            self.config.host.clone(),
            self.config.effective_port().to_string(),
        ]
    }
}

impl NotificationProvider for KodiProvider {
    fn descriptor(&self) -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }
}
