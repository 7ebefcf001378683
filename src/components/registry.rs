// Registry: the single entry point for per-id and bulk notification operations
// Known ids come straight from the attribute store keys, never from an in-memory index.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::attributes::NotificationAttributes;
use super::notification::{Notification, NotificationServices};
use super::{NotificationError, NotificationId, NotificationResult};

/// Outcome of a best-effort pass over many ids
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<NotificationId>,
    pub failed: Vec<(NotificationId, NotificationError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-id lock held for one unit of work
///
/// The lock map entry is dropped on release once no other task holds or waits on it.
pub(crate) struct IdGuard<'a> {
    id: NotificationId,
    locks: &'a DashMap<NotificationId, Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

pub struct NotificationRegistry {
    services: Arc<NotificationServices>,
    /// Serializes operations on the same id
    locks: DashMap<NotificationId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for NotificationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRegistry")
            .field("services", &self.services)
            .field("locked_ids", &self.locks.len())
            .finish()
    }
}

impl NotificationRegistry {
    pub fn new(services: Arc<NotificationServices>) -> Self {
        Self {
            services,
            locks: DashMap::new(),
        }
    }

    pub fn services(&self) -> &Arc<NotificationServices> {
        &self.services
    }

    /// Hold the per-id lock for the duration of one unit of work
    pub(crate) async fn lock(&self, id: NotificationId) -> IdGuard<'_> {
        let mutex = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        IdGuard {
            id,
            locks: &self.locks,
            guard: Some(mutex.lock_owned().await),
        }
    }

    /// Ids with a lock currently held or awaited
    pub fn locked_ids(&self) -> usize {
        self.locks.len()
    }

    /// Stand-in for a record that no longer decodes, enough to tear down its id
    fn unreadable(&self, id: NotificationId) -> Notification {
        let attributes = NotificationAttributes {
            id: Some(id.get()),
            ..NotificationAttributes::default()
        };
        Notification::new(id, attributes, self.services.clone())
    }

    /// Update when `id` already has a record, otherwise create
    pub async fn create_or_update(
        &self,
        id: NotificationId,
        mut attributes: NotificationAttributes,
    ) -> NotificationResult<Notification> {
        attributes.id = Some(id.get());
        let _guard = self.lock(id).await;

        if !self.services.store.contains(id)? {
            return Notification::new(id, attributes, self.services.clone()).create().await;
        }

        match Notification::load(id, self.services.clone()) {
            Ok(existing) => existing.update(attributes).await,
            Err(NotificationError::StoreFailure { message }) => {
                // Unreadable record: drop it and start over under the new attributes
                tracing::warn!(id = %id, error = %message, "Replacing unreadable notification record");
                attributes.timing()?;
                self.unreadable(id).delete().await?;
                Notification::new(id, attributes, self.services.clone()).create().await
            },
            Err(e) => Err(e),
        }
    }

    /// Reconstruct a persisted notification; immediate notifications are never findable
    pub async fn find(&self, id: NotificationId) -> NotificationResult<Notification> {
        let _guard = self.lock(id).await;
        Notification::load(id, self.services.clone())
    }

    /// Delete and hand back the notification as it was
    ///
    /// A record that no longer decodes is still removed, along with its timer and
    /// alert; the returned notification then carries only the id.
    pub async fn delete(&self, id: NotificationId) -> NotificationResult<Notification> {
        let _guard = self.lock(id).await;
        let notification = match Notification::load(id, self.services.clone()) {
            Ok(notification) => notification,
            Err(NotificationError::StoreFailure { message }) => {
                tracing::warn!(id = %id, error = %message, "Deleting unreadable notification record");
                self.unreadable(id)
            },
            Err(e) => return Err(e),
        };
        notification.delete().await?;
        Ok(notification)
    }

    pub async fn clear(&self, id: NotificationId) -> NotificationResult<Notification> {
        let _guard = self.lock(id).await;
        let notification = Notification::load(id, self.services.clone())?;
        notification.clear().await?;
        Ok(notification)
    }

    /// Ids of every notification with a persisted record, ascending
    pub fn ids(&self) -> NotificationResult<Vec<NotificationId>> {
        Ok(self.services.store.keys()?.into_iter().collect())
    }

    /// Remove every visible alert; records and timers are untouched
    pub async fn clear_all(&self) -> NotificationResult<()> {
        self.services.renderer.dismiss_all().await?;
        tracing::info!("All notifications cleared");
        Ok(())
    }

    /// Delete every known id, isolating failures per id
    pub async fn delete_all(&self) -> NotificationResult<BatchReport> {
        let mut report = BatchReport::default();

        for id in self.ids()? {
            match self.delete(id).await {
                Ok(_) => report.succeeded.push(id),
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "Failed to delete notification");
                    report.failed.push((id, e));
                },
            }
        }

        tracing::info!(
            deleted = report.succeeded.len(),
            failed = report.failed.len(),
            "Delete-all finished"
        );
        Ok(report)
    }
}
