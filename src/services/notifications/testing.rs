//! Recording transport used by provider tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::external::{HttpRequest, HttpResponse, Transport, TransportError};

use super::provider::ProviderContext;

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<HttpRequest>,
    statuses: VecDeque<u16>,
    fail: bool,
}

/// Records every request and answers with scripted statuses
///
/// Once the script is exhausted the last status keeps being returned (200
/// when none was given).
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn with_statuses(statuses: &[u16]) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().statuses = statuses.iter().copied().collect();
        mock
    }

    /// Every request fails below the HTTP layer
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().fail = true;
        mock
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Body of the `index`th request as JSON
    pub fn json_body(&self, index: usize) -> serde_json::Value {
        serde_json::from_str(&self.requests()[index].body).unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        let url = request.url.clone();
        state.requests.push(request);

        if state.fail {
            return Err(TransportError::Connection {
                url,
                message: "connection refused".to_string(),
            });
        }

        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front().unwrap_or(200)
        } else {
            state.statuses.front().copied().unwrap_or(200)
        };

        Ok(HttpResponse {
            status,
            body: String::new(),
        })
    }
}

/// Context routing through `mock`, with throttling off
pub fn test_context(mock: &MockTransport) -> ProviderContext {
    ProviderContext::new(Arc::new(mock.clone())).with_throttle(false)
}
