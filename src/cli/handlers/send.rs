//! Send command handler

use crate::error::AppResult;
use crate::models::NotificationMessage;
use crate::services::NotificationService;

/// Handler for the send command
pub struct SendCommandHandler {
    service: NotificationService,
}

impl SendCommandHandler {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }

    /// Deliver `message` to every URL
    ///
    /// # Returns
    /// `Ok(true)` when every service accepted the message, `Ok(false)` when
    /// at least one delivery failed
    ///
    /// # Errors
    /// Any URL that fails to build; nothing is sent in that case
    pub async fn execute(&self, urls: &[String], message: &NotificationMessage) -> AppResult<bool> {
        let delivered = self.service.notify(urls, message).await?;

        if delivered {
            println!("✓ Notification sent to {} service(s)", urls.len());
        } else {
            eprintln!("✗ Notification could not be delivered to every service");
        }

        Ok(delivered)
    }
}
