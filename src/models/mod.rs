//! Domain types passed between the CLI, the service layer and providers.

mod asset;
mod notification;

pub use asset::AppAsset;
pub use notification::{ImageSize, NotificationMessage, NotifyType};
