//! Notification service for sending one message to many URLs.

use std::sync::Arc;

use super::provider::{NotificationProvider, ProviderContext};
use super::registry::ProviderRegistry;
use crate::error::AppResult;
use crate::models::NotificationMessage;

/// Sends messages to notification URLs through the provider registry
///
/// Cloning is cheap; the registry is shared.
#[derive(Clone)]
pub struct NotificationService {
    registry: Arc<ProviderRegistry>,
    context: ProviderContext,
}

impl NotificationService {
    /// Creates a new NotificationService
    ///
    /// # Arguments
    /// * `registry` - Providers available by schema
    /// * `context` - Transport and defaults providers are built with
    pub fn new(registry: Arc<ProviderRegistry>, context: ProviderContext) -> Self {
        Self { registry, context }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    /// Builds a provider for every URL
    ///
    /// The first URL that fails to parse or validate aborts the whole batch.
    pub fn build_all(&self, urls: &[String]) -> AppResult<Vec<Box<dyn NotificationProvider>>> {
        urls.iter()
            .map(|url| self.registry.build(url, &self.context))
            .collect()
    }

    /// Sends `message` to every URL
    ///
    /// Every provider is built before anything is sent, so a bad URL means
    /// nothing is delivered. Delivery then runs sequentially.
    ///
    /// # Returns
    /// `true` when every provider reported success
    pub async fn notify(&self, urls: &[String], message: &NotificationMessage) -> AppResult<bool> {
        let providers = self.build_all(urls)?;
        let mut all_sent = true;

        for provider in &providers {
            let sent = provider
                .send(&message.body, &message.title, message.notify_type)
                .await;

            if !sent {
                tracing::warn!(
                    service = provider.name(),
                    url = %provider.url(true),
                    "Notification was not delivered"
                );
                all_sent = false;
            }
        }

        tracing::info!(
            providers = providers.len(),
            success = all_sent,
            "Notification dispatch finished"
        );

        Ok(all_sent)
    }
}
