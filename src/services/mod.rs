//! Service layer.
//!
//! Services coordinate providers and the transport on behalf of the CLI and
//! library callers.

pub mod notifications;

pub use notifications::NotificationService;
