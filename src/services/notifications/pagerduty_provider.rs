//! PagerDuty notification provider implementation.
//!
//! Triggers incidents through the PagerDuty Events API v2.
//!
//! URL form: `pagerduty://{integrationkey}@{apikey}[/{source}[/{component}]]`
//!
//! PagerDuty API Reference: https://developer.pagerduty.com/docs/events-api-v2/trigger-events/

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::json;

use super::descriptor::{DEFAULT_REQUEST_RATE_PER_SEC, ServiceDescriptor, ServiceLimits};
use super::dispatch::{Dispatcher, RequestOverrides};
use super::provider::{FromNotifyUrl, NotificationProvider, Notify, ProviderContext, RenderUrl};
use crate::error::{AppError, AppResult};
use crate::external::HttpRequest;
use crate::models::{AppAsset, ImageSize, NotifyType};
use crate::utils::parse::parse_bool;
use crate::utils::url::{NotifyUrl, pprint_secret, quote, render_query};

const DEFAULT_SOURCE: &str = "Herald";
const DEFAULT_COMPONENT: &str = "Notification";
const EVENT_ACTION: &str = "trigger";

pub static DESCRIPTOR: ServiceDescriptor = ServiceDescriptor {
    service_name: "Pager Duty",
    service_url: "https://pagerduty.com/",
    setup_url: "https://developer.pagerduty.com/docs/events-api-v2/overview/",
    protocols: &[],
    secure_protocols: &["pagerduty"],
    templates: &[
        "{schema}://{integrationkey}@{apikey}",
        "{schema}://{integrationkey}@{apikey}/{source}",
        "{schema}://{integrationkey}@{apikey}/{source}/{component}",
    ],
    verify_host: false,
    limits: ServiceLimits {
        title_maxlen: Some(0),
        ..ServiceLimits::DEFAULT
    },
    request_rate_per_sec: DEFAULT_REQUEST_RATE_PER_SEC,
    image_size: Some(ImageSize::Xy128),
    accepted_status: &[200, 201, 202],
    status_overrides: &[],
};

/// Events API region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            Region::Us => "https://events.pagerduty.com/v2/enqueue",
            Region::Eu => "https://events.eu.pagerduty.com/v2/enqueue",
        }
    }
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            _ => Err(AppError::validation("region", s, "expected one of: us, eu")),
        }
    }
}

/// Incident severity, ordered as PagerDuty lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Resolve a severity from a case-insensitive prefix (`crit`, `w`, ...)
    ///
    /// # Returns
    /// `None` for an empty value, the first matching severity otherwise
    pub fn resolve(value: &str) -> AppResult<Option<Severity>> {
        let prefix = value.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        Self::ALL
            .iter()
            .copied()
            .find(|severity| severity.as_str().starts_with(&prefix))
            .map(Some)
            .ok_or_else(|| {
                AppError::validation(
                    "severity",
                    value,
                    "expected one of: info, warning, error, critical",
                )
            })
    }

    /// Severity used when none was configured
    pub fn for_notify_type(notify_type: NotifyType) -> Severity {
        match notify_type {
            NotifyType::Info | NotifyType::Success => Severity::Info,
            NotifyType::Warning => Severity::Warning,
            NotifyType::Failure => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields read from a `pagerduty://` URL, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct PagerDutyOptions {
    pub api_key: Option<String>,
    pub integration_key: Option<String>,
    pub source: Option<String>,
    pub component: Option<String>,
    pub group: Option<String>,
    pub class_id: Option<String>,
    pub click: Option<String>,
    pub region: Option<String>,
    pub severity: Option<String>,
    pub include_image: bool,
    /// `+key=value` entries, sent as `custom_details`
    pub details: BTreeMap<String, String>,
    pub request: RequestOverrides,
}

impl Default for PagerDutyOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            integration_key: None,
            source: None,
            component: None,
            group: None,
            class_id: None,
            click: None,
            region: None,
            severity: None,
            include_image: true,
            details: BTreeMap::new(),
            request: RequestOverrides::default(),
        }
    }
}

/// Validated PagerDuty settings
#[derive(Debug, Clone, PartialEq)]
pub struct PagerDutyConfig {
    pub api_key: String,
    pub integration_key: String,
    pub source: String,
    pub component: String,
    pub region: Region,
    /// Fixed severity; `None` derives it from the notification type
    pub severity: Option<Severity>,
    pub group: Option<String>,
    pub class_id: Option<String>,
    pub click: Option<String>,
    pub details: BTreeMap<String, String>,
    pub include_image: bool,
}

impl PagerDutyConfig {
    /// Validates parsed options
    ///
    /// Fields are checked in declaration order and the first failure is
    /// returned.
    pub fn from_options(options: PagerDutyOptions) -> AppResult<Self> {
        let api_key = required_key("apikey", options.api_key)?;
        let integration_key = required_key("integrationkey", options.integration_key)?;

        let region = match options.region {
            Some(region) => region.parse()?,
            None => Region::default(),
        };

        let severity = match options.severity {
            Some(severity) => Severity::resolve(&severity)?,
            None => None,
        };

        Ok(Self {
            api_key,
            integration_key,
            source: non_blank(options.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            component: non_blank(options.component)
                .unwrap_or_else(|| DEFAULT_COMPONENT.to_string()),
            region,
            severity,
            group: non_blank(options.group),
            class_id: non_blank(options.class_id),
            click: non_blank(options.click),
            details: options.details,
            include_image: options.include_image,
        })
    }
}

fn required_key(field: &str, value: Option<String>) -> AppResult<String> {
    let raw = value.unwrap_or_default();
    let key = raw.trim();

    if key.is_empty() {
        return Err(AppError::validation(field, raw.as_str(), "a value is required"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(AppError::validation(field, raw.as_str(), "whitespace is not allowed"));
    }

    Ok(key.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// PagerDuty notification provider
///
/// Every `send` triggers one event. Without an explicit severity the
/// notification type decides it; the title is folded into the summary since
/// events carry no separate title.
pub struct PagerDutyProvider {
    config: PagerDutyConfig,
    asset: AppAsset,
    dispatcher: Dispatcher,
}

impl PagerDutyProvider {
    /// Creates a provider from parsed options
    ///
    /// # Arguments
    /// * `options` - Options read from the URL
    /// * `context` - Transport, asset and request defaults
    pub fn new(options: PagerDutyOptions, context: &ProviderContext) -> AppResult<Self> {
        let request = options.request;
        let config = PagerDutyConfig::from_options(options)?;

        Ok(Self {
            config,
            asset: context.asset.clone(),
            dispatcher: Dispatcher::new(&DESCRIPTOR, context, request),
        })
    }

    pub fn config(&self) -> &PagerDutyConfig {
        &self.config
    }

    /// Builds the Events API request body
    fn build_payload(&self, summary: &str, notify_type: NotifyType) -> serde_json::Value {
        let severity = self
            .config
            .severity
            .unwrap_or_else(|| Severity::for_notify_type(notify_type));

        let mut payload = json!({
            "routing_key": self.config.integration_key,
            "payload": {
                "summary": summary,
                "severity": severity.as_str(),
                "source": self.config.source,
                "component": self.config.component,
            },
            "client": self.asset.app_id,
            "event_action": EVENT_ACTION,
        });

        if let Some(group) = &self.config.group {
            payload["payload"]["group"] = json!(group);
        }

        if let Some(class_id) = &self.config.class_id {
            payload["payload"]["class"] = json!(class_id);
        }

        if let Some(click) = &self.config.click {
            payload["links"] = json!([{ "href": click }]);
        }

        if self.config.include_image {
            if let Some(image_url) = DESCRIPTOR.image_url(&self.asset, notify_type) {
                payload["images"] = json!([{ "src": image_url, "alt": notify_type.as_str() }]);
            }
        }

        if !self.config.details.is_empty() {
            payload["payload"]["custom_details"] = json!(self.config.details);
        }

        payload
    }
}

impl FromNotifyUrl for PagerDutyProvider {
    type Options = PagerDutyOptions;

    fn service() -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }

    fn parse_url(url: &NotifyUrl) -> AppResult<PagerDutyOptions> {
        let mut segments = url.path_segments().into_iter();
        let positional_source = segments.next();
        let positional_component = segments.next();

        let query = |key: &str| url.query(key).map(str::to_string);

        Ok(PagerDutyOptions {
            api_key: query("apikey").or_else(|| Some(url.host.clone())),
            integration_key: query("integrationkey").or_else(|| url.user.clone()),
            source: query("source").or(positional_source),
            component: query("component").or(positional_component),
            group: query("group"),
            class_id: query("class"),
            click: query("click"),
            region: query("region"),
            severity: url.qsd.get("severity").cloned(),
            include_image: url
                .query("image")
                .map(|value| parse_bool(value, true))
                .unwrap_or(true),
            details: url.qsd_plus.clone(),
            request: RequestOverrides::from_url(url),
        })
    }

    fn from_options(options: PagerDutyOptions, context: &ProviderContext) -> AppResult<Self> {
        Self::new(options, context)
    }
}

#[async_trait]
impl Notify for PagerDutyProvider {
    async fn send(&self, body: &str, title: &str, notify_type: NotifyType) -> bool {
        let (_, summary) = DESCRIPTOR.limits.apply(title, body);
        let payload = self.build_payload(&summary, notify_type);

        let request = HttpRequest::post(self.config.region.api_url(), payload.to_string())
            .header("User-Agent", self.asset.app_id.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Token token={}", self.config.api_key));

        self.dispatcher
            .post(&self.config.source, request)
            .await
    }
}

impl RenderUrl for PagerDutyProvider {
    fn url(&self, privacy: bool) -> String {
        let mut params = vec![
            ("region".to_string(), self.config.region.as_str().to_string()),
            (
                "image".to_string(),
                if self.config.include_image { "yes" } else { "no" }.to_string(),
            ),
        ];

        let optional = [
            ("class", self.config.class_id.as_deref()),
            ("group", self.config.group.as_deref()),
            ("click", self.config.click.as_deref()),
            ("severity", self.config.severity.map(|s| s.as_str())),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.push((key.to_string(), value.to_string()));
            }
        }

        params.extend(self.dispatcher.url_parameters());
        params.extend(
            self.config
                .details
                .iter()
                .map(|(key, value)| (format!("+{}", key), value.clone())),
        );

        format!(
            "pagerduty://{}@{}/{}/{}/{}",
            pprint_secret(&self.config.integration_key, privacy),
            pprint_secret(&self.config.api_key, privacy),
            quote(&self.config.source),
            quote(&self.config.component),
            render_query(&params),
        )
    }

    fn url_identifier(&self) -> Vec<String> {
        vec![
            "pagerduty".to_string(),
            self.config.integration_key.clone(),
            self.config.api_key.clone(),
            self.config.source.clone(),
        ]
    }
}

impl NotificationProvider for PagerDutyProvider {
    fn descriptor(&self) -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }
}
