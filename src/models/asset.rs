//! Application identity and icon resolution shared by all providers.

use super::notification::{ImageSize, NotifyType};

/// Identity the library presents to remote services, plus the icon store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppAsset {
    /// Sent as `User-Agent` and as the PagerDuty `client`
    pub app_id: String,
    pub app_desc: String,
    /// URL template with `{THEME}`, `{TYPE}` and `{XY}` placeholders; empty
    /// disables images
    pub image_url_mask: String,
    pub theme: String,
}

impl Default for AppAsset {
    fn default() -> Self {
        Self {
            app_id: "Herald".to_string(),
            app_desc: "Herald Notifications".to_string(),
            image_url_mask: String::new(),
            theme: "default".to_string(),
        }
    }
}

impl AppAsset {
    /// Icon URL for a notification type, or `None` when images are disabled
    pub fn image_url(&self, notify_type: NotifyType, size: ImageSize) -> Option<String> {
        if self.image_url_mask.trim().is_empty() {
            return None;
        }

        Some(
            self.image_url_mask
                .replace("{THEME}", &self.theme)
                .replace("{TYPE}", notify_type.as_str())
                .replace("{XY}", size.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_disabled_by_default() {
        let asset = AppAsset::default();
        assert!(asset.image_url(NotifyType::Info, ImageSize::Xy128).is_none());
    }

    #[test]
    fn test_image_url_substitutes_placeholders() {
        let asset = AppAsset {
            image_url_mask: "https://cdn.example.com/{THEME}/icon-{TYPE}-{XY}.png".to_string(),
            ..Default::default()
        };
        assert_eq!(
            asset.image_url(NotifyType::Failure, ImageSize::Xy128).as_deref(),
            Some("https://cdn.example.com/default/icon-failure-128x128.png")
        );
    }
}
