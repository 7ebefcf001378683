// Re-arms persisted notifications after a device restart

use std::sync::Arc;

use super::notification::Notification;
use super::registry::{BatchReport, NotificationRegistry};
use super::{NotificationId, NotificationResult};

pub type ReconcileReport = BatchReport;

#[derive(Debug, Clone)]
pub struct RebootReconciler {
    registry: Arc<NotificationRegistry>,
}

impl RebootReconciler {
    pub fn new(registry: Arc<NotificationRegistry>) -> Self {
        Self { registry }
    }

    /// Re-arm every persisted notification without showing anything
    ///
    /// Fire times that already passed are left to the timer service, which fires
    /// them at its next tick. One id failing never stops the rest.
    pub async fn reconcile(&self) -> NotificationResult<ReconcileReport> {
        let ids = self.registry.ids()?;
        tracing::info!(count = ids.len(), "Re-arming notification alarms after restart");

        let mut report = ReconcileReport::default();
        for id in ids {
            match self.rearm(id).await {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "Failed to re-arm notification after restart");
                    report.failed.push((id, e));
                },
            }
        }

        Ok(report)
    }

    async fn rearm(&self, id: NotificationId) -> NotificationResult<()> {
        let _guard = self.registry.lock(id).await;
        let notification = Notification::load(id, self.registry.services().clone())?;

        notification.cancel_alarm();
        if notification.arm()? {
            tracing::info!(id = %id, "Alarm re-armed after restart");
        } else {
            tracing::warn!(id = %id, "Persisted notification has no delayed or scheduled timing, skipping");
        }
        Ok(())
    }
}
