//! Render command handler

use crate::error::AppResult;
use crate::services::NotificationService;

/// Handler for the render command
pub struct RenderCommandHandler {
    service: NotificationService,
}

impl RenderCommandHandler {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }

    /// Print the canonical form of `url` and return it
    pub fn execute(&self, url: &str, privacy: bool) -> AppResult<String> {
        let provider = self
            .service
            .registry()
            .build(url, self.service.context())?;

        let rendered = provider.url(privacy);
        println!("{}", rendered);
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::ProviderRegistry;
    use crate::services::notifications::testing::{MockTransport, test_context};
    use std::sync::Arc;

    fn handler() -> RenderCommandHandler {
        RenderCommandHandler::new(NotificationService::new(
            Arc::new(ProviderRegistry::default()),
            test_context(&MockTransport::default()),
        ))
    }

    #[test]
    fn test_render_kodi() {
        let rendered = handler().execute("KODI://media.local:9090", false).unwrap();
        assert!(rendered.starts_with("kodi://media.local:9090"));
    }

    #[test]
    fn test_render_privacy_hides_token() {
        let token = "abcdefghijABCDEFGHIJ0123456789ab";
        let rendered = handler()
            .execute(&format!("zulip://alerts@acme/{}/ops", token), true)
            .unwrap();

        assert!(rendered.starts_with("zulip://alerts@acme/"));
        assert!(!rendered.contains(token));
    }

    #[test]
    fn test_render_invalid_url() {
        assert!(handler().execute("pagerduty://ik@key?region=ca", false).is_err());
    }
}
