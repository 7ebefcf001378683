// Declared configuration for one notification
// Field presence is significant: absent fields stay absent through persistence and
// reflection, except autoClear which defaults to true.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::repeat::RepeatType;
use super::{NotificationError, NotificationId, NotificationResult, serde_millis};

/// Full attribute set for one notification, as supplied by the caller and as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAttributes {
    // Identity and content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Opaque action string handed back on tap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Opaque payload string handed back on tap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(rename = "channelID", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    // Timing: delayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed: Option<bool>,
    /// Milliseconds from now, on the uptime clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,

    // Timing: scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<bool>,
    /// Absolute first-fire time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_millis")]
    pub send_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_day: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_week_day: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_hour: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at_minute: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_every: Option<String>,
    /// Kept as the raw string so unrecognized values survive a round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_type: Option<String>,
    /// Custom interval in milliseconds, used when `repeat_type` is "time"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_millis")]
    pub end_at: Option<i64>,

    // Presentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lights: Option<String>,
    #[serde(default = "default_auto_clear")]
    pub auto_clear: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_alert_once: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_millis")]
    pub when: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_style_url_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_style_image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_text: Option<String>,
    /// 0..=1000, anything else renders an indeterminate bar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_end: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox_style: Option<InboxStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn default_auto_clear() -> bool {
    true
}

impl Default for NotificationAttributes {
    fn default() -> Self {
        Self {
            id: None,
            subject: None,
            message: None,
            action: None,
            payload: None,
            channel_id: None,
            channel_name: None,
            delayed: None,
            delay: None,
            scheduled: None,
            send_at: None,
            send_at_year: None,
            send_at_month: None,
            send_at_day: None,
            send_at_week_day: None,
            send_at_hour: None,
            send_at_minute: None,
            repeat_every: None,
            repeat_type: None,
            repeat_time: None,
            repeat_count: None,
            end_at: None,
            priority: None,
            small_icon: None,
            large_icon: None,
            sound: None,
            vibrate: None,
            lights: None,
            auto_clear: default_auto_clear(),
            only_alert_once: None,
            ticker_text: None,
            when: None,
            big_text: None,
            big_style_url_image: None,
            big_style_image_base64: None,
            sub_text: None,
            progress: None,
            progress_end: None,
            lifetime: None,
            color: None,
            number: None,
            category: None,
            local_only: None,
            inbox_style: None,
            group: None,
        }
    }
}

/// Inbox presentation: a title, a summary, and ordered lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_content_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
}

/// Resolved timing decision for an attribute set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Show now; nothing is persisted or armed
    Immediate,
    /// One-shot after `delay` on the uptime clock
    Delayed { delay: Duration },
    /// First fire at `send_at`, optionally repeating
    Scheduled {
        send_at: i64,
        repeat: Option<RepeatType>,
    },
}

impl TimingMode {
    pub fn is_pending(&self) -> bool {
        !matches!(self, TimingMode::Immediate)
    }
}

impl NotificationAttributes {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Builder pattern methods for fluent API construction
    pub fn with_id(mut self, id: NotificationId) -> Self {
        self.id = Some(id.get());
        self
    }

    pub fn with_delay(mut self, delay_ms: i64) -> Self {
        self.delayed = Some(true);
        self.delay = Some(delay_ms);
        self
    }

    pub fn scheduled_at(mut self, send_at_ms: i64) -> Self {
        self.scheduled = Some(true);
        self.send_at = Some(send_at_ms);
        self
    }

    pub fn with_repeat(mut self, repeat_type: impl Into<String>) -> Self {
        self.repeat_type = Some(repeat_type.into());
        self
    }

    pub fn with_repeat_time(mut self, repeat_time_ms: i64) -> Self {
        self.repeat_type = Some("time".to_string());
        self.repeat_time = Some(repeat_time_ms);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_big_text(mut self, big_text: impl Into<String>) -> Self {
        self.big_text = Some(big_text.into());
        self
    }

    pub fn with_inbox_style(mut self, inbox_style: InboxStyle) -> Self {
        self.inbox_style = Some(inbox_style);
        self
    }

    pub fn is_delayed(&self) -> bool {
        self.delayed.unwrap_or(false)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.unwrap_or(false)
    }

    /// Whether this attribute set implies a timer and a persisted record
    pub fn is_pending(&self) -> bool {
        self.is_delayed() || self.is_scheduled()
    }

    /// Resolve the timing mode; `delayed` takes precedence over `scheduled`
    pub fn timing(&self) -> NotificationResult<TimingMode> {
        if self.is_delayed() {
            let delay = self.delay.ok_or_else(|| {
                NotificationError::malformed("delay", "delayed notification requires a delay")
            })?;
            return Ok(TimingMode::Delayed {
                delay: Duration::from_millis(delay.max(0) as u64),
            });
        }

        if self.is_scheduled() {
            let send_at = self.send_at.ok_or_else(|| {
                NotificationError::malformed("sendAt", "scheduled notification requires sendAt")
            })?;
            let repeat = match self.repeat_type.as_deref() {
                Some(repeat_type) => RepeatType::parse(repeat_type, self.repeat_time)?,
                None => None,
            };
            return Ok(TimingMode::Scheduled { send_at, repeat });
        }

        Ok(TimingMode::Immediate)
    }

    /// Decode a caller-supplied attribute map
    pub fn from_json_value(value: serde_json::Value) -> NotificationResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| NotificationError::malformed("attributes", e.to_string()))
    }

    /// Reflect the attribute set back to the caller
    pub fn to_json_value(&self) -> NotificationResult<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| NotificationError::malformed("attributes", e.to_string()))
    }
}
