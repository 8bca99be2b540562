//! Check command handler
//!
//! Validates notification URLs and lists the supported services without
//! contacting any of them.

use crate::services::NotificationService;

/// Handler for the check command
pub struct CheckCommandHandler {
    service: NotificationService,
}

impl CheckCommandHandler {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }

    /// Print every supported service with its schemas
    pub fn list(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .service
            .registry()
            .descriptors()
            .iter()
            .map(|descriptor| {
                let schemas: Vec<String> =
                    descriptor.schemas().map(|schema| format!("{}://", schema)).collect();
                format!(
                    "{:<12} {:<36} {}",
                    descriptor.service_name,
                    schemas.join(" "),
                    descriptor.setup_url
                )
            })
            .collect();

        for line in &lines {
            println!("{}", line);
        }
        lines
    }

    /// Build every URL and report the outcome of each
    ///
    /// # Returns
    /// `true` when every URL is valid
    pub fn check(&self, urls: &[String]) -> bool {
        let mut all_valid = true;

        for url in urls {
            match self.service.registry().build(url, self.service.context()) {
                Ok(provider) => {
                    println!(
                        "✓ {} ({} target(s)): {}",
                        provider.name(),
                        provider.target_count(),
                        provider.url(true)
                    );
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    all_valid = false;
                }
            }
        }

        all_valid
    }
}
