//! Static description of each notification service.
//!
//! Every provider publishes one [`ServiceDescriptor`]: the schemas it answers
//! to, its documentation links, message limits and HTTP expectations. The
//! registry and the CLI read this table; providers read their own entry when
//! sending.

use crate::models::{AppAsset, ImageSize, NotifyType};

/// Requests per second allowed when a provider does not say otherwise
pub const DEFAULT_REQUEST_RATE_PER_SEC: f64 = 5.5;

/// Message size limits a service imposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Maximum title length in characters. `Some(0)` means the service has
    /// no title field and the title is folded into the body.
    pub title_maxlen: Option<usize>,
    /// Maximum body length in characters
    pub body_maxlen: Option<usize>,
    /// Maximum number of body lines kept
    pub body_max_line_count: Option<usize>,
}

impl ServiceLimits {
    pub const DEFAULT: ServiceLimits = ServiceLimits {
        title_maxlen: Some(250),
        body_maxlen: Some(32768),
        body_max_line_count: None,
    };

    /// Fit `title` and `body` into the service limits
    ///
    /// # Returns
    /// The `(title, body)` pair to send
    pub fn apply(&self, title: &str, body: &str) -> (String, String) {
        let mut title = title.trim().to_string();
        let mut body = body.to_string();

        match self.title_maxlen {
            Some(0) => {
                if !title.is_empty() {
                    body = if body.is_empty() {
                        title
                    } else {
                        format!("{}\r\n{}", title, body)
                    };
                }
                title = String::new();
            }
            Some(max) => title = truncate_chars(&title, max),
            None => {}
        }

        if let Some(max_lines) = self.body_max_line_count {
            body = body.lines().take(max_lines).collect::<Vec<_>>().join("\r\n");
        }

        if let Some(max) = self.body_maxlen {
            body = truncate_chars(&body, max);
        }

        (title, body)
    }
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Registry metadata for one notification service
#[derive(Debug)]
pub struct ServiceDescriptor {
    /// Human readable service name, also used in log lines
    pub service_name: &'static str,
    pub service_url: &'static str,
    pub setup_url: &'static str,
    /// Plain-text schemas
    pub protocols: &'static [&'static str],
    /// TLS schemas
    pub secure_protocols: &'static [&'static str],
    /// Accepted URL shapes, for documentation
    pub templates: &'static [&'static str],
    /// Whether the URL host must be a real hostname
    pub verify_host: bool,
    pub limits: ServiceLimits,
    /// `0.0` disables throttling
    pub request_rate_per_sec: f64,
    /// Icon size to request, `None` when the service shows no images
    pub image_size: Option<ImageSize>,
    /// Status codes that count as a successful delivery
    pub accepted_status: &'static [u16],
    /// Service-specific explanations for failure status codes
    pub status_overrides: &'static [(u16, &'static str)],
}

impl ServiceDescriptor {
    /// Every schema this service answers to
    pub fn schemas(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.protocols
            .iter()
            .chain(self.secure_protocols.iter())
            .copied()
    }

    pub fn handles(&self, schema: &str) -> bool {
        self.schemas().any(|known| known.eq_ignore_ascii_case(schema))
    }

    pub fn is_secure_schema(&self, schema: &str) -> bool {
        self.secure_protocols
            .iter()
            .any(|known| known.eq_ignore_ascii_case(schema))
    }

    /// Icon for `notify_type` at this service's image size, if any
    pub fn image_url(&self, asset: &AppAsset, notify_type: NotifyType) -> Option<String> {
        self.image_size
            .and_then(|size| asset.image_url(notify_type, size))
    }
}
