//! Zulip notification provider implementation.
//!
//! Posts messages as a bot user. Email targets receive private messages,
//! everything else is treated as a stream name.
//!
//! URL form: `zulip://{botname}@{organization}/{token}[/{targets}...]`
//!
//! Zulip API Reference: https://zulip.com/api/send-message

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::descriptor::{DEFAULT_REQUEST_RATE_PER_SEC, ServiceDescriptor, ServiceLimits};
use super::dispatch::{Dispatcher, RequestOverrides};
use super::provider::{FromNotifyUrl, NotificationProvider, Notify, ProviderContext, RenderUrl};
use crate::error::{AppError, AppResult};
use crate::external::HttpRequest;
use crate::models::{AppAsset, NotifyType};
use crate::utils::parse::{dedup_preserving_order, is_email, parse_list};
use crate::utils::url::{NotifyUrl, form_encode, pprint_secret, quote, render_query};

pub const DEFAULT_HOSTNAME: &str = "zulipchat.com";
pub const DEFAULT_STREAM: &str = "general";

const BOT_SUFFIX: &str = "-bot";

static BOTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,32}$").expect("valid botname regex"));

static ORGANIZATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<org>[A-Za-z0-9_-]{1,32})(\.(?P<hostname>\S+))?$")
        .expect("valid organization regex")
});

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{32}$").expect("valid token regex"));

pub static DESCRIPTOR: ServiceDescriptor = ServiceDescriptor {
    service_name: "Zulip",
    service_url: "https://zulipchat.com/",
    setup_url: "https://zulip.com/api/send-message",
    protocols: &[],
    secure_protocols: &["zulip"],
    templates: &[
        "{schema}://{botname}@{organization}/{token}",
        "{schema}://{botname}@{organization}/{token}/{targets}",
    ],
    verify_host: false,
    limits: ServiceLimits {
        title_maxlen: Some(60),
        body_maxlen: Some(10000),
        body_max_line_count: None,
    },
    request_rate_per_sec: DEFAULT_REQUEST_RATE_PER_SEC,
    image_size: None,
    accepted_status: &[200],
    status_overrides: &[(401, "Unauthorized - Invalid Token.")],
};

/// Fields read from a `zulip://` URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZulipOptions {
    pub botname: Option<String>,
    /// Organization, optionally followed by `.hostname`
    pub organization: Option<String>,
    pub token: Option<String>,
    pub targets: Vec<String>,
    pub request: RequestOverrides,
}

/// Validated Zulip settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZulipConfig {
    /// Bot name without the `-bot` suffix
    pub botname: String,
    pub organization: String,
    pub hostname: String,
    pub token: String,
    /// Streams and email addresses, in delivery order
    pub targets: Vec<String>,
}

impl ZulipConfig {
    pub fn from_options(options: ZulipOptions) -> AppResult<Self> {
        let botname = validate_botname(options.botname.unwrap_or_default())?;

        let raw_organization = options.organization.unwrap_or_default();
        let captures = ORGANIZATION_RE
            .captures(raw_organization.trim())
            .ok_or_else(|| {
                AppError::validation(
                    "organization",
                    raw_organization.as_str(),
                    "expected 1-32 letters, digits, '_' or '-', optionally followed by .hostname",
                )
            })?;
        let organization = captures["org"].to_string();
        let hostname = captures
            .name("hostname")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());

        let raw_token = options.token.unwrap_or_default();
        let token = raw_token.trim();
        if !TOKEN_RE.is_match(token) {
            return Err(AppError::validation(
                "token",
                raw_token.as_str(),
                "expected 32 letters or digits",
            ));
        }
        let token = token.to_string();

        let mut targets = dedup_preserving_order(
            options
                .targets
                .iter()
                .flat_map(|target| parse_list(target))
                .collect(),
        );
        if targets.is_empty() {
            targets.push(DEFAULT_STREAM.to_string());
        }

        Ok(Self {
            botname,
            organization,
            hostname,
            token,
            targets,
        })
    }

    /// Identity the bot authenticates as
    pub fn bot_email(&self) -> String {
        format!(
            "{}{}@{}.{}",
            self.botname, BOT_SUFFIX, self.organization, self.hostname
        )
    }

    pub fn endpoint(&self) -> String {
        format!("https://{}.{}/api/v1/messages", self.organization, self.hostname)
    }
}

fn validate_botname(raw: String) -> AppResult<String> {
    let trimmed = raw.trim();
    // The 32 character limit applies to the name without its -bot suffix
    let name = trimmed.strip_suffix(BOT_SUFFIX).unwrap_or(trimmed);
    if !BOTNAME_RE.is_match(name) {
        return Err(AppError::validation(
            "botname",
            raw.as_str(),
            "expected 1-32 letters, digits, '_' or '-' before an optional -bot suffix",
        ));
    }

    Ok(name.to_string())
}

/// Zulip notification provider
///
/// One POST per target, sent one after another. A failed target is logged
/// and the remaining targets are still attempted.
pub struct ZulipProvider {
    config: ZulipConfig,
    asset: AppAsset,
    dispatcher: Dispatcher,
}

impl ZulipProvider {
    pub fn new(options: ZulipOptions, context: &ProviderContext) -> AppResult<Self> {
        let request = options.request;
        let config = ZulipConfig::from_options(options)?;

        Ok(Self {
            config,
            asset: context.asset.clone(),
            dispatcher: Dispatcher::new(&DESCRIPTOR, context, request),
        })
    }

    pub fn config(&self) -> &ZulipConfig {
        &self.config
    }

    /// Form body addressed to `target`
    fn build_form(&self, title: &str, body: &str, target: &str) -> String {
        let (kind, to) = match is_email(target) {
            Some(address) => ("private", address.full_email),
            None => ("stream", target.to_string()),
        };

        form_encode(&[
            ("subject", title),
            ("content", body),
            ("type", kind),
            ("to", to.as_str()),
        ])
    }
}

impl FromNotifyUrl for ZulipProvider {
    type Options = ZulipOptions;

    fn service() -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }

    fn parse_url(url: &NotifyUrl) -> AppResult<ZulipOptions> {
        let mut targets = url.path_segments();

        let token = match url.query("token") {
            Some(token) => Some(token.to_string()),
            None if !targets.is_empty() => Some(targets.remove(0)),
            None => None,
        };

        if let Some(to) = url.query("to") {
            targets.extend(parse_list(to));
        }

        Ok(ZulipOptions {
            botname: url.user.clone(),
            organization: Some(url.host.clone()),
            token,
            targets,
            request: RequestOverrides::from_url(url),
        })
    }

    fn from_options(options: ZulipOptions, context: &ProviderContext) -> AppResult<Self> {
        Self::new(options, context)
    }
}

#[async_trait]
impl Notify for ZulipProvider {
    async fn send(&self, body: &str, title: &str, _notify_type: NotifyType) -> bool {
        let (title, body) = DESCRIPTOR.limits.apply(title, body);
        let endpoint = self.config.endpoint();
        let mut has_error = false;

        for target in &self.config.targets {
            let request = HttpRequest::post(endpoint.as_str(), self.build_form(&title, &body, target))
                .header("User-Agent", self.asset.app_id.as_str())
                .header(
                    "Content-Type",
                    "application/x-www-form-urlencoded; charset=utf-8",
                )
                .basic_auth(self.config.bot_email(), Some(self.config.token.clone()));

            if !self.dispatcher.post(target, request).await {
                has_error = true;
            }
        }

        !has_error
    }
}

impl RenderUrl for ZulipProvider {
    fn url(&self, privacy: bool) -> String {
        let organization = if self.config.hostname == DEFAULT_HOSTNAME {
            self.config.organization.clone()
        } else {
            format!("{}.{}", self.config.organization, self.config.hostname)
        };

        let targets: Vec<String> = self.config.targets.iter().map(|t| quote(t)).collect();

        format!(
            "zulip://{}@{}/{}/{}/{}",
            quote(&self.config.botname),
            quote(&organization),
            pprint_secret(&self.config.token, privacy),
            targets.join("/"),
            render_query(&self.dispatcher.url_parameters()),
        )
    }

    fn url_identifier(&self) -> Vec<String> {
        vec![
            "zulip".to_string(),
            self.config.organization.clone(),
            self.config.hostname.clone(),
            self.config.token.clone(),
        ]
    }

    fn target_count(&self) -> usize {
        self.config.targets.len()
    }
}

impl NotificationProvider for ZulipProvider {
    fn descriptor(&self) -> &'static ServiceDescriptor {
        &DESCRIPTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::testing::{MockTransport, test_context};

    const TOKEN: &str = "abcdefghijABCDEFGHIJ0123456789ab";

    fn build(url: &str, mock: &MockTransport) -> AppResult<ZulipProvider> {
        ZulipProvider::from_url(url, &test_context(mock))
    }

    #[test]
    fn test_botname_suffix_stripped() {
        let mock = MockTransport::default();
        let with_suffix = build(&format!("zulip://goober-bot@apprise/{TOKEN}"), &mock).unwrap();
        let without = build(&format!("zulip://goober@apprise/{TOKEN}"), &mock).unwrap();

        assert_eq!(with_suffix.config().botname, "goober");
        assert_eq!(without.config().botname, "goober");
        assert_eq!(with_suffix.config().bot_email(), "goober-bot@apprise.zulipchat.com");
    }

    #[test]
    fn test_botname_length_excludes_suffix() {
        let mock = MockTransport::default();
        let longest = "b".repeat(32);

        let provider = build(&format!("zulip://{longest}-bot@apprise/{TOKEN}"), &mock).unwrap();
        assert_eq!(provider.config().botname, longest);
        assert_eq!(
            provider.config().bot_email(),
            format!("{longest}-bot@apprise.zulipchat.com")
        );

        let provider = build(&format!("zulip://{longest}@apprise/{TOKEN}"), &mock).unwrap();
        assert_eq!(provider.config().botname, longest);

        let too_long = "b".repeat(33);
        for botname in [too_long.clone(), format!("{too_long}-bot"), "-bot".to_string()] {
            let err = build(&format!("zulip://{botname}@apprise/{TOKEN}"), &mock)
                .err()
                .unwrap();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field == "botname"));
        }
    }

    #[test]
    fn test_defaults() {
        let mock = MockTransport::default();
        let provider = build(&format!("zulip://bot@apprise/{TOKEN}"), &mock).unwrap();

        let config = provider.config();
        assert_eq!(config.organization, "apprise");
        assert_eq!(config.hostname, "zulipchat.com");
        assert_eq!(config.targets, vec!["general"]);
        assert_eq!(config.endpoint(), "https://apprise.zulipchat.com/api/v1/messages");
        assert_eq!(provider.target_count(), 1);
    }

    #[test]
    fn test_custom_hostname_and_targets() {
        let mock = MockTransport::default();
        let provider = build(
            &format!("zulip://bot@team.chat.example.com/{TOKEN}/devops/alice@example.com/devops?to=ops,%23alerts"),
            &mock,
        )
        .unwrap();

        let config = provider.config();
        assert_eq!(config.organization, "team");
        assert_eq!(config.hostname, "chat.example.com");
        assert_eq!(config.targets, vec!["devops", "alice@example.com", "ops", "alerts"]);
        assert_eq!(provider.target_count(), 4);
    }

    #[test]
    fn test_token_from_query() {
        let mock = MockTransport::default();
        let provider = build(&format!("zulip://bot@apprise/devops?token={TOKEN}"), &mock).unwrap();

        assert_eq!(provider.config().token, TOKEN);
        assert_eq!(provider.config().targets, vec!["devops"]);
    }

    #[test]
    fn test_validation_failures() {
        let mock = MockTransport::default();

        let short_token = &TOKEN[..31];
        let err = build(&format!("zulip://bot@apprise/{short_token}"), &mock).err().unwrap();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "token"));

        let err = build(&format!("zulip://with%20a%20space@apprise/{TOKEN}"), &mock)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "botname"));

        let err = build(&format!("zulip://apprise/{TOKEN}"), &mock).err().unwrap();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "botname"));

        let err = build(&format!("zulip://bot@bad%20org/{TOKEN}"), &mock).err().unwrap();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "organization"));

        assert!(build("zulip://bot@apprise", &mock).is_err());
    }

    #[tokio::test]
    async fn test_private_then_stream() {
        let mock = MockTransport::with_statuses(&[200]);
        let provider = build(
            &format!("zulip://bot@apprise/{TOKEN}/alice@example.com/general"),
            &mock,
        )
        .unwrap();

        assert!(provider.send("Disk full", "Alert", NotifyType::Warning).await);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].body,
            "subject=Alert&content=Disk%20full&type=private&to=alice%40example.com"
        );
        assert_eq!(
            requests[1].body,
            "subject=Alert&content=Disk%20full&type=stream&to=general"
        );
        assert_eq!(requests[0].url, "https://apprise.zulipchat.com/api/v1/messages");
        assert_eq!(
            requests[0].header_value("Content-Type"),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
        assert_eq!(
            requests[0].basic_auth,
            Some(("bot-bot@apprise.zulipchat.com".to_string(), Some(TOKEN.to_string())))
        );
    }

    #[tokio::test]
    async fn test_partial_failure_continues() {
        let mock = MockTransport::with_statuses(&[401, 200]);
        let provider = build(
            &format!("zulip://bot@apprise/{TOKEN}/alice@example.com/general"),
            &mock,
        )
        .unwrap();

        assert!(!provider.send("body", "title", NotifyType::Info).await);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_on_last_target_reported() {
        let mock = MockTransport::with_statuses(&[200, 500]);
        let provider = build(
            &format!("zulip://bot@apprise/{TOKEN}/alice@example.com/general"),
            &mock,
        )
        .unwrap();

        assert!(!provider.send("body", "title", NotifyType::Info).await);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_returns_false() {
        let mock = MockTransport::with_statuses(&[500]);
        let provider = build(&format!("zulip://bot@apprise/{TOKEN}"), &mock).unwrap();
        assert!(!provider.send("body", "title", NotifyType::Info).await);
    }

    #[tokio::test]
    async fn test_title_truncated() {
        let mock = MockTransport::with_statuses(&[200]);
        let provider = build(&format!("zulip://bot@apprise/{TOKEN}"), &mock).unwrap();

        let title = "t".repeat(80);
        assert!(provider.send("body", &title, NotifyType::Info).await);
        let expected = format!("subject={}&", "t".repeat(60));
        assert!(mock.requests()[0].body.starts_with(&expected));
    }

    #[test]
    fn test_render_url() {
        let mock = MockTransport::default();
        let provider = build(
            &format!("zulip://goober-bot@team.chat.example.com/{TOKEN}/alice@example.com/general"),
            &mock,
        )
        .unwrap();

        assert_eq!(
            provider.url(false),
            format!("zulip://goober@team.chat.example.com/{TOKEN}/alice%40example.com/general/")
        );
        assert_eq!(
            provider.url(true),
            "zulip://goober@team.chat.example.com/****/alice%40example.com/general/"
        );

        let reparsed = build(&provider.url(false), &mock).unwrap();
        assert_eq!(reparsed.config(), provider.config());

        let default_host = build(&format!("zulip://bot@apprise/{TOKEN}"), &mock).unwrap();
        assert_eq!(
            default_host.url(false),
            format!("zulip://bot@apprise/{TOKEN}/general/")
        );
        assert_eq!(
            default_host.url_identifier(),
            vec!["zulip", "apprise", "zulipchat.com", TOKEN]
        );
    }
}
