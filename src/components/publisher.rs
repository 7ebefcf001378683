// Handles timer fires: rebuild the notification from its record and show it

use std::sync::Arc;

use super::notification::Notification;
use super::registry::NotificationRegistry;
use super::{NotificationId, NotificationResult};

#[derive(Debug, Clone)]
pub struct PublishHandler {
    registry: Arc<NotificationRegistry>,
}

impl PublishHandler {
    pub fn new(registry: Arc<NotificationRegistry>) -> Self {
        Self { registry }
    }

    /// Show the notification whose timer fired
    ///
    /// The record and timer are left alone: one-shot timers do not fire again and
    /// repeating timers re-fire on their own until an explicit delete.
    pub async fn publish(&self, id: NotificationId) -> NotificationResult<()> {
        let _guard = self.registry.lock(id).await;
        let notification = Notification::load(id, self.registry.services().clone())?;
        notification.show().await
    }

    /// Like `publish`, but failures are logged instead of returned
    pub async fn on_fire(&self, id: NotificationId) {
        match self.publish(id).await {
            Ok(()) => tracing::debug!(id = %id, "Timer fire published"),
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %id, "Timer fired for a notification with no record, ignoring");
            },
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to publish fired notification"),
        }
    }
}
