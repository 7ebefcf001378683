use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{NotificationError, NotificationResult};

/// Runtime configuration for rendering defaults, image fetching and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Application name presented to the notification server
    pub app_name: String,
    /// Channel used when an attribute set names none
    pub default_channel_id: String,
    pub default_channel_name: String,
    /// Small icon used when an attribute set names none
    pub default_small_icon: String,
    /// Whole-request timeout for big-picture downloads
    pub image_fetch_timeout: Duration,
    pub image_connect_timeout: Duration,
    /// Downloads larger than this are rejected
    pub max_image_bytes: u64,
    pub user_agent: String,
    /// Record file for `JsonFileStore`; `None` keeps records in memory
    pub store_path: Option<PathBuf>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: "local-notify".to_string(),
            default_channel_id: "channel_0".to_string(),
            default_channel_name: "Default".to_string(),
            default_small_icon: "ic_launcher".to_string(),
            image_fetch_timeout: Duration::from_secs(30),
            image_connect_timeout: Duration::from_secs(10),
            max_image_bytes: 10 * 1024 * 1024,
            user_agent: concat!("local-notify/", env!("CARGO_PKG_VERSION")).to_string(),
            store_path: None,
        }
    }
}

impl NotificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_default_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.default_channel_id = id.into();
        self.default_channel_name = name.into();
        self
    }

    pub fn with_default_small_icon(mut self, icon: impl Into<String>) -> Self {
        self.default_small_icon = icon.into();
        self
    }

    pub fn with_image_timeouts(mut self, fetch: Duration, connect: Duration) -> Self {
        self.image_fetch_timeout = fetch;
        self.image_connect_timeout = connect;
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Parse a JSON configuration document; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> NotificationResult<Self> {
        serde_json::from_str(json).map_err(|e| NotificationError::malformed("config", e.to_string()))
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> NotificationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            NotificationError::malformed("config", format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}
