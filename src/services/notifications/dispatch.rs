//! Request plumbing shared by all providers.
//!
//! [`Dispatcher`] owns a provider's transport handle, effective request
//! options and throttle, and turns a transport outcome into the boolean
//! result `send` reports.

use std::sync::Arc;
use std::time::Duration;

use crate::external::client::status_reason;
use crate::external::{HttpRequest, MAX_TIMEOUT_SECS, RequestOptions, Transport};
use crate::utils::parse::parse_bool;
use crate::utils::url::NotifyUrl;

use super::descriptor::ServiceDescriptor;
use super::provider::ProviderContext;
use super::throttle::Throttle;

/// Per-URL overrides of the request defaults (`verify`, `rto`, `cto`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestOverrides {
    pub verify_certificate: Option<bool>,
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl RequestOverrides {
    /// Read the common parameters from a parsed URL
    ///
    /// Unusable timeouts, including values above [`MAX_TIMEOUT_SECS`], are
    /// ignored with a warning rather than failing the whole URL.
    pub fn from_url(url: &NotifyUrl) -> Self {
        Self {
            verify_certificate: url.query("verify").map(|value| parse_bool(value, true)),
            request_timeout: url.query("rto").and_then(|value| parse_seconds("rto", value)),
            connect_timeout: url.query("cto").and_then(|value| parse_seconds("cto", value)),
        }
    }

    /// Apply the overrides on top of `defaults`
    pub fn apply(&self, defaults: RequestOptions) -> RequestOptions {
        RequestOptions {
            verify_certificate: self
                .verify_certificate
                .unwrap_or(defaults.verify_certificate),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
        }
    }
}

fn parse_seconds(key: &str, value: &str) -> Option<Duration> {
    match value.parse::<f64>() {
        Ok(seconds) if seconds > 0.0 && seconds <= MAX_TIMEOUT_SECS => {
            Some(Duration::from_secs_f64(seconds))
        }
        _ => {
            tracing::warn!(key, value, "Ignoring invalid timeout");
            None
        }
    }
}

fn format_seconds(duration: Duration) -> String {
    duration.as_secs_f64().to_string()
}

/// Sends a provider's requests and classifies the responses
pub struct Dispatcher {
    descriptor: &'static ServiceDescriptor,
    transport: Arc<dyn Transport>,
    defaults: RequestOptions,
    options: RequestOptions,
    throttle: Throttle,
}

impl Dispatcher {
    pub fn new(
        descriptor: &'static ServiceDescriptor,
        context: &ProviderContext,
        overrides: RequestOverrides,
    ) -> Self {
        let throttle = if context.throttle {
            Throttle::new(descriptor.request_rate_per_sec)
        } else {
            Throttle::disabled()
        };

        Self {
            descriptor,
            transport: Arc::clone(&context.transport),
            defaults: context.request,
            options: overrides.apply(context.request),
            throttle,
        }
    }

    pub fn options(&self) -> RequestOptions {
        self.options
    }

    /// Common URL parameters, only those that differ from the defaults
    pub fn url_parameters(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if self.options.verify_certificate != self.defaults.verify_certificate {
            let verify = if self.options.verify_certificate { "yes" } else { "no" };
            params.push(("verify".to_string(), verify.to_string()));
        }
        if self.options.request_timeout != self.defaults.request_timeout {
            params.push(("rto".to_string(), format_seconds(self.options.request_timeout)));
        }
        if self.options.connect_timeout != self.defaults.connect_timeout {
            params.push(("cto".to_string(), format_seconds(self.options.connect_timeout)));
        }

        params
    }

    /// POST `request` and report whether the service accepted it
    ///
    /// # Arguments
    /// * `target` - What the request is addressed to, for log lines
    /// * `request` - The request; its options are replaced by the provider's
    pub async fn post(&self, target: &str, mut request: HttpRequest) -> bool {
        let service = self.descriptor.service_name;
        request.options = self.options;

        tracing::debug!(
            service,
            url = %request.url,
            verify = self.options.verify_certificate,
            "Sending notification"
        );
        tracing::debug!(service, payload = %request.body, "Notification payload");

        self.throttle.wait().await;

        match self.transport.post(request).await {
            Ok(response) if self.descriptor.accepted_status.contains(&response.status) => {
                tracing::info!(service, target, "Sent notification");
                true
            }
            Ok(response) => {
                let reason = status_reason(response.status, self.descriptor.status_overrides)
                    .unwrap_or("unknown error");
                tracing::warn!(
                    service,
                    target,
                    status = response.status,
                    reason,
                    "Failed to send notification"
                );
                tracing::debug!(service, response = %response.body, "Response details");
                false
            }
            Err(err) => {
                tracing::warn!(service, target, error = %err, "Failed to send notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::testing::{MockTransport, test_context};

    fn url(raw: &str) -> NotifyUrl {
        NotifyUrl::parse(raw, false).unwrap()
    }

    #[test]
    fn test_overrides_from_url() {
        let overrides = RequestOverrides::from_url(&url("kodi://host?verify=no&rto=2.5&cto=abc"));
        assert_eq!(overrides.verify_certificate, Some(false));
        assert_eq!(overrides.request_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(overrides.connect_timeout, None);
    }

    #[test]
    fn test_overrides_ignore_out_of_range_timeouts() {
        let overrides = RequestOverrides::from_url(&url("kodi://host?rto=1e300&cto=inf"));
        assert_eq!(overrides.request_timeout, None);
        assert_eq!(overrides.connect_timeout, None);

        let overrides = RequestOverrides::from_url(&url("kodi://host?rto=3600&cto=3600.5"));
        assert_eq!(overrides.request_timeout, Some(Duration::from_secs(3600)));
        assert_eq!(overrides.connect_timeout, None);
    }

    #[test]
    fn test_provider_with_huge_timeout_uses_defaults() {
        use crate::services::notifications::{FromNotifyUrl, RenderUrl};

        let mock = MockTransport::default();
        let provider = crate::services::notifications::KodiProvider::from_url(
            "kodi://media.local?rto=1e300",
            &test_context(&mock),
        )
        .unwrap();
        assert!(!provider.url(false).contains("rto="));
    }

    #[test]
    fn test_url_parameters_only_list_changes() {
        let mock = MockTransport::with_statuses(&[200]);
        let context = test_context(&mock);

        let unchanged = Dispatcher::new(
            &crate::services::notifications::kodi_provider::DESCRIPTOR,
            &context,
            RequestOverrides::from_url(&url("kodi://host?verify=yes&rto=4")),
        );
        assert!(unchanged.url_parameters().is_empty());

        let changed = Dispatcher::new(
            &crate::services::notifications::kodi_provider::DESCRIPTOR,
            &context,
            RequestOverrides::from_url(&url("kodi://host?verify=no&cto=1.5")),
        );
        assert_eq!(
            changed.url_parameters(),
            vec![
                ("verify".to_string(), "no".to_string()),
                ("cto".to_string(), "1.5".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_post_applies_options_and_classifies_status() {
        let mock = MockTransport::with_statuses(&[200, 500]);
        let context = test_context(&mock);
        let dispatcher = Dispatcher::new(
            &crate::services::notifications::kodi_provider::DESCRIPTOR,
            &context,
            RequestOverrides::from_url(&url("kodi://host?verify=no")),
        );

        assert!(dispatcher.post("host", HttpRequest::post("http://host/jsonrpc", "{}")).await);
        assert!(!dispatcher.post("host", HttpRequest::post("http://host/jsonrpc", "{}")).await);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].options.verify_certificate);
    }

    #[tokio::test]
    async fn test_post_transport_error_is_false() {
        let mock = MockTransport::failing();
        let context = test_context(&mock);
        let dispatcher = Dispatcher::new(
            &crate::services::notifications::kodi_provider::DESCRIPTOR,
            &context,
            RequestOverrides::default(),
        );

        assert!(!dispatcher.post("host", HttpRequest::post("http://host/jsonrpc", "{}")).await);
    }
}
