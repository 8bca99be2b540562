//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use std::sync::Arc;

use super::handlers::{CheckCommandHandler, RenderCommandHandler, SendCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::models::NotificationMessage;
use crate::services::NotificationService;
use crate::services::notifications::{ProviderContext, ProviderRegistry};

/// Execute a CLI command with the given settings
///
/// # Returns
/// `Ok(true)` when the command fully succeeded; `Ok(false)` when a
/// notification was not delivered or a URL failed its check
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<bool> {
    let context = ProviderContext::from_settings(&settings);
    execute_with_context(cli, context).await
}

/// Execute a CLI command against an explicit provider context
pub async fn execute_with_context(cli: &Cli, context: ProviderContext) -> AppResult<bool> {
    let service = NotificationService::new(Arc::new(ProviderRegistry::default()), context);

    match &cli.command {
        Commands::Send {
            urls,
            body,
            title,
            notify_type,
        } => {
            let message = NotificationMessage::new(body.as_str())
                .with_title(title.as_str())
                .with_type((*notify_type).into());
            SendCommandHandler::new(service).execute(urls, &message).await
        }
        Commands::Render { url, privacy } => {
            RenderCommandHandler::new(service).execute(url, *privacy)?;
            Ok(true)
        }
        Commands::Check { urls, list } => {
            let handler = CheckCommandHandler::new(service);
            if *list {
                handler.list();
            }
            Ok(handler.check(urls))
        }
    }
}
