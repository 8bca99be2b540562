//! Scheme-keyed provider registry.
//!
//! Maps every schema a provider answers to onto a factory, so a URL can be
//! turned into a provider without knowing its service up front.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::utils::url::{NotifyUrl, schema_of};

use super::descriptor::ServiceDescriptor;
use super::kodi_provider::KodiProvider;
use super::pagerduty_provider::PagerDutyProvider;
use super::provider::{FromNotifyUrl, NotificationProvider, ProviderContext};
use super::zulip_provider::ZulipProvider;

/// Factory building a boxed provider from a parsed URL
pub type ProviderFactory =
    fn(&NotifyUrl, &ProviderContext) -> AppResult<Box<dyn NotificationProvider>>;

#[derive(Clone, Copy)]
struct RegistryEntry {
    descriptor: &'static ServiceDescriptor,
    factory: ProviderFactory,
}

fn instantiate<P>(url: &NotifyUrl, context: &ProviderContext) -> AppResult<Box<dyn NotificationProvider>>
where
    P: FromNotifyUrl + NotificationProvider + 'static,
{
    Ok(Box::new(P::from_notify_url(url, context)?))
}

/// Registry of notification providers keyed by URL schema
///
/// # Example
/// ```ignore
/// let registry = ProviderRegistry::default();
/// let provider = registry.build("kodi://media.local", &ProviderContext::default())?;
/// provider.send("Backup finished", "", NotifyType::Success).await;
/// ```
pub struct ProviderRegistry {
    entries: HashMap<&'static str, RegistryEntry>,
    descriptors: Vec<&'static ServiceDescriptor>,
}

impl ProviderRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            descriptors: Vec::new(),
        }
    }

    /// Register provider `P` under every schema its descriptor lists
    ///
    /// A schema already registered is taken over by `P`.
    pub fn register<P>(&mut self) -> &mut Self
    where
        P: FromNotifyUrl + NotificationProvider + 'static,
    {
        let descriptor = P::service();
        let entry = RegistryEntry {
            descriptor,
            factory: instantiate::<P>,
        };

        for schema in descriptor.schemas() {
            if self.entries.insert(schema, entry).is_some() {
                tracing::warn!(schema, service = descriptor.service_name, "Schema re-registered");
            }
        }

        if !self
            .descriptors
            .iter()
            .any(|known| std::ptr::eq(*known, descriptor))
        {
            self.descriptors.push(descriptor);
        }

        self
    }

    /// Build the provider responsible for `url`
    ///
    /// # Errors
    /// - `InvalidUrl` when no schema can be read
    /// - `UnsupportedScheme` when no provider handles the schema
    /// - whatever the provider raises while validating its fields
    pub fn build(
        &self,
        url: &str,
        context: &ProviderContext,
    ) -> AppResult<Box<dyn NotificationProvider>> {
        let schema =
            schema_of(url).ok_or_else(|| AppError::invalid_url(url, "missing or malformed schema"))?;

        let entry = self
            .entries
            .get(schema.as_str())
            .ok_or(AppError::UnsupportedScheme { scheme: schema })?;

        let parsed = NotifyUrl::parse(url, entry.descriptor.verify_host)?;
        (entry.factory)(&parsed, context)
    }

    pub fn supports(&self, schema: &str) -> bool {
        self.entries.contains_key(schema.to_lowercase().as_str())
    }

    /// Registered services in registration order
    pub fn descriptors(&self) -> &[&'static ServiceDescriptor] {
        &self.descriptors
    }
}

impl Default for ProviderRegistry {
    /// Registry with every built-in provider
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register::<PagerDutyProvider>()
            .register::<KodiProvider>()
            .register::<ZulipProvider>();
        registry
    }
}
