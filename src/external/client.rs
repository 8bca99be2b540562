use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

use super::transport::{HttpRequest, HttpResponse, RequestOptions, Transport, TransportError};

/// Clients are shared per (certificate verification, connect timeout) pair
type ClientKey = (bool, Duration);

/// [`Transport`] backed by pooled `reqwest` clients
///
/// Certificate verification and the connect timeout are client-level settings
/// in reqwest, so one client is built lazily for every combination requested
/// and reused afterwards.
///
/// # Benefits
/// - **Connection pooling**: Reuses TCP connections for better performance
/// - **Security**: Uses Rustls for TLS (no OpenSSL dependency)
///
/// # Example
/// ```ignore
/// let transport = ReqwestTransport::new();
/// let response = transport
///     .post(HttpRequest::post("https://example.com/hook", "{}"))
///     .await?;
/// ```
#[derive(Default)]
pub struct ReqwestTransport {
    clients: DashMap<ClientKey, reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_for(&self, options: &RequestOptions) -> Result<reqwest::Client, TransportError> {
        let key = (options.verify_certificate, options.connect_timeout);
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(options).map_err(TransportError::Client)?;
        self.clients.insert(key, client.clone());
        Ok(client)
    }
}

fn build_client(options: &RequestOptions) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        // Timeouts
        .connect_timeout(options.connect_timeout)
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        // Security
        .danger_accept_invalid_certs(!options.verify_certificate)
        .build()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = self.client_for(&request.options)?;

        let mut builder = client
            .post(&request.url)
            .timeout(request.options.request_timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some((user, password)) = &request.basic_auth {
            builder = builder.basic_auth(user, password.as_ref());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: request.url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}

/// Human readable reason for an HTTP status, with provider-specific overrides
pub fn status_reason(status: u16, overrides: &[(u16, &'static str)]) -> Option<&'static str> {
    overrides
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, reason)| *reason)
        .or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(404, &[]), Some("Not Found"));
        assert_eq!(
            status_reason(401, &[(401, "Unauthorized - Invalid Token.")]),
            Some("Unauthorized - Invalid Token.")
        );
    }

    #[test]
    fn test_clients_are_reused_per_options() {
        let transport = ReqwestTransport::new();
        let options = RequestOptions::default();
        transport.client_for(&options).unwrap();
        transport.client_for(&options).unwrap();
        assert_eq!(transport.clients.len(), 1);

        let insecure = RequestOptions {
            verify_certificate: false,
            ..options
        };
        transport.client_for(&insecure).unwrap();
        assert_eq!(transport.clients.len(), 2);
    }

    #[tokio::test]
    async fn test_post_sends_headers_auth_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::post(format!("{}/hook", server.uri()), "{}")
            .header("Content-Type", "application/json")
            .basic_auth("user", Some("pass".to_string()));

        let response = ReqwestTransport::new().post(request).await.unwrap();
        assert_eq!(response.status, 202);
        assert_eq!(response.body, "queued");
    }

    #[tokio::test]
    async fn test_post_connection_failure_is_an_error() {
        // Nothing listens on port 9 (discard) on loopback in test environments
        let request = HttpRequest::post("http://127.0.0.1:9/hook", "{}");
        let result = ReqwestTransport::new().post(request).await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
