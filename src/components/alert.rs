// Rendered alert: the platform-neutral description handed to an AlertRenderer
// Built from attributes with channel/icon defaults, style precedence and
// best-effort decoration (images and colors that fail are dropped, not fatal).

use serde::{Deserialize, Serialize};

use super::attributes::NotificationAttributes;
use super::config::NotificationConfig;
use super::NotificationId;
use crate::backends::image_utils::{self, PictureSource, ResolvedImage};

/// Upper bound of a determinate progress bar
pub const PROGRESS_MAX: i32 = 1000;

/// Event raised to the host when a rendered alert is tapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapEvent {
    #[serde(rename = "notificationID")]
    pub id: NotificationId,
    pub action: Option<String>,
    pub payload: Option<String>,
}

/// Notification channel the alert is posted to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// Platform default behaviors requested by "default" sound/vibrate/lights
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDefaults {
    pub sound: bool,
    pub vibrate: bool,
    pub lights: bool,
}

impl AlertDefaults {
    pub fn any(&self) -> bool {
        self.sound || self.vibrate || self.lights
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertStyle {
    Plain,
    BigText(String),
    BigPicture(ResolvedImage),
    Inbox {
        title: Option<String>,
        summary: Option<String>,
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    Determinate { current: i32, max: i32 },
    Indeterminate,
}

impl Progress {
    pub fn from_value(value: i32) -> Self {
        if (0..=PROGRESS_MAX).contains(&value) {
            Progress::Determinate {
                current: value,
                max: PROGRESS_MAX,
            }
        } else {
            Progress::Indeterminate
        }
    }
}

/// Packed 0xAARRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    /// Parse `#RRGGBB` (opaque) or `#AARRGGBB`
    pub fn parse(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Argb(0xFF00_0000 | value)),
            8 => Some(Argb(value)),
            _ => None,
        }
    }

    pub fn rgb_hex(&self) -> String {
        format!("#{:06x}", self.0 & 0x00FF_FFFF)
    }
}

/// Everything a renderer needs to display one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: NotificationId,
    pub channel: Channel,
    pub title: Option<String>,
    pub body: Option<String>,
    pub small_icon: String,
    pub large_icon: Option<String>,
    /// Dismiss on tap
    pub auto_cancel: bool,
    pub priority: Option<i32>,
    /// Group key; grouped alerts are posted as the group summary
    pub group: Option<String>,
    pub style: AlertStyle,
    pub defaults: AlertDefaults,
    pub sound_uri: Option<String>,
    pub only_alert_once: Option<bool>,
    pub ticker: Option<String>,
    pub when: Option<i64>,
    pub color: Option<Argb>,
    pub sub_text: Option<String>,
    pub progress: Option<Progress>,
    pub number: Option<i32>,
    pub local_only: Option<bool>,
    pub category: Option<String>,
    pub tap: TapEvent,
}

impl Alert {
    /// Build the alert for `id`; never fails, decoration that cannot be produced is dropped
    pub async fn build(
        id: NotificationId,
        attributes: &NotificationAttributes,
        config: &NotificationConfig,
    ) -> Self {
        let channel = Channel {
            id: attributes
                .channel_id
                .clone()
                .unwrap_or_else(|| config.default_channel_id.clone()),
            name: attributes
                .channel_name
                .clone()
                .unwrap_or_else(|| config.default_channel_name.clone()),
        };

        let inbox = attributes.inbox_style.as_ref();

        // Defaults only apply outside inbox presentation
        let defaults = if inbox.is_some() {
            AlertDefaults::default()
        } else {
            AlertDefaults {
                sound: attributes.sound.as_deref() == Some("default"),
                vibrate: attributes.vibrate.as_deref() == Some("default"),
                lights: attributes.lights.as_deref() == Some("default"),
            }
        };

        let style = Self::resolve_style(id, attributes, config).await;

        let color = attributes.color.as_deref().and_then(|raw| {
            let parsed = Argb::parse(raw);
            if parsed.is_none() {
                tracing::warn!(id = %id, color = raw, "Ignoring unparsable notification color");
            }
            parsed
        });

        Alert {
            id,
            channel,
            title: attributes.subject.clone(),
            body: attributes.message.clone(),
            small_icon: attributes
                .small_icon
                .clone()
                .unwrap_or_else(|| config.default_small_icon.clone()),
            large_icon: attributes.large_icon.clone(),
            auto_cancel: attributes.auto_clear,
            priority: attributes.priority,
            group: attributes.group.clone(),
            style,
            defaults,
            sound_uri: attributes
                .sound
                .clone()
                .filter(|sound| sound != "default"),
            only_alert_once: attributes.only_alert_once,
            ticker: attributes.ticker_text.clone(),
            when: attributes.when,
            color,
            sub_text: attributes.sub_text.clone(),
            progress: attributes.progress.map(Progress::from_value),
            number: attributes.number,
            local_only: attributes.local_only,
            category: attributes.category.clone(),
            tap: TapEvent {
                id,
                action: attributes.action.clone(),
                payload: attributes.payload.clone(),
            },
        }
    }

    /// Big text beats a big picture, which beats inbox lines
    async fn resolve_style(
        id: NotificationId,
        attributes: &NotificationAttributes,
        config: &NotificationConfig,
    ) -> AlertStyle {
        if let Some(big_text) = &attributes.big_text {
            return AlertStyle::BigText(big_text.clone());
        }

        let source = match (
            attributes.big_style_url_image.as_deref().filter(|url| !url.is_empty()),
            attributes.big_style_image_base64.as_deref(),
        ) {
            (Some(url), _) => Some(PictureSource::Url(url)),
            (None, Some(data)) => Some(PictureSource::Base64(data)),
            (None, None) => None,
        };

        if let Some(source) = source {
            match image_utils::resolve_picture(&source, config).await {
                Ok(image) => return AlertStyle::BigPicture(image),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Big picture unavailable, rendering without it");
                },
            }
        }

        match &attributes.inbox_style {
            Some(inbox) => AlertStyle::Inbox {
                title: inbox.big_content_title.clone(),
                summary: inbox.summary_text.clone(),
                lines: inbox.lines.clone().unwrap_or_default(),
            },
            None => AlertStyle::Plain,
        }
    }
}
