// Notification lifecycle and scheduling core
// Entities, persistence layer, timer policy and the event surface the host drives

use serde::{Deserialize, Serialize};

pub mod alert;
pub mod attributes;
pub mod bridge;
pub mod center;
pub mod clock;
pub mod config;
pub mod notification;
pub mod platform;
pub mod publisher;
pub mod reconciler;
pub mod registry;
pub mod repeat;
pub mod serde_millis;
pub mod store;

pub use alert::{Alert, AlertDefaults, AlertStyle, Argb, Channel, Progress, TapEvent};
pub use attributes::{InboxStyle, NotificationAttributes, TimingMode};
pub use bridge::NotificationModule;
pub use center::NotificationCenter;
pub use clock::{Clock, SystemClock};
pub use config::NotificationConfig;
pub use notification::{Notification, NotificationServices};
pub use platform::{AlertRenderer, PlatformFuture, TimerAdapter};
pub use publisher::PublishHandler;
pub use reconciler::{RebootReconciler, ReconcileReport};
pub use registry::{BatchReport, NotificationRegistry};
pub use repeat::{AlarmSchedule, RepeatType};
pub use store::{AttributeStore, KeyValueStore};

/// Caller-supplied notification identifier, unique within the app's namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i32);

impl NotificationId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Key under which the attribute record for this id is persisted
    pub fn store_key(self) -> String {
        self.0.to_string()
    }
}

impl From<i32> for NotificationId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<NotificationId> for i32 {
    fn from(id: NotificationId) -> Self {
        id.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Error taxonomy for every per-id and bulk operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    /// The requested id has no persisted record
    #[error("Notification {id} not found")]
    NotFound { id: NotificationId },

    /// A required attribute combination is missing or invalid
    #[error("Malformed attributes in {field}: {message}")]
    MalformedAttributes { field: String, message: String },

    /// Alert construction or platform display failed
    #[error("Render failure: {message}")]
    RenderFailure { message: String },

    /// Persistence read or write failed
    #[error("Store failure: {message}")]
    StoreFailure { message: String },

    /// The timer service refused to arm
    #[error("Timer failure for notification {id}: {message}")]
    TimerFailure { id: NotificationId, message: String },
}

impl NotificationError {
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedAttributes {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl std::fmt::Display) -> Self {
        Self::StoreFailure {
            message: message.to_string(),
        }
    }

    pub fn render(message: impl std::fmt::Display) -> Self {
        Self::RenderFailure {
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Type alias for notification results
pub type NotificationResult<T> = Result<T, NotificationError>;
