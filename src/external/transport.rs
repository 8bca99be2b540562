//! Transport seam between providers and the network.
//!
//! Providers describe a single POST as an [`HttpRequest`] and hand it to a
//! [`Transport`]. Production code uses [`super::ReqwestTransport`]; tests
//! substitute a recording implementation.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Longest request or connect timeout accepted from settings, flags or URLs
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Per-request network settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOptions {
    /// Verify the server's TLS certificate
    pub verify_certificate: bool,
    /// Total time allowed for the request, including reading the response
    pub request_timeout: Duration,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            request_timeout: Duration::from_secs(4),
            connect_timeout: Duration::from_secs(4),
        }
    }
}

/// A single outbound POST
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// HTTP basic credentials as `(user, password)`
    pub basic_auth: Option<(String, Option<String>)>,
    pub options: RequestOptions,
}

impl HttpRequest {
    /// Create a POST to `url` carrying `body`
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: body.into(),
            basic_auth: None,
            options: RequestOptions::default(),
        }
    }

    /// Append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach HTTP basic credentials
    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some((user.into(), password));
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Failures below the HTTP status layer (DNS, connect, TLS, timeout)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },
}

/// Sends provider requests over the network
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a POST and return the response, whatever its status
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("https://example.com/hook", "{}")
            .header("Content-Type", "application/json")
            .basic_auth("bot", Some("secret".to_string()));

        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(
            request.basic_auth,
            Some(("bot".to_string(), Some("secret".to_string())))
        );
        assert!(request.options.verify_certificate);
    }
}
