// Attribute persistence
// A raw string key-value store underneath, the serialized attribute record on top.
// The key set is the authoritative list of notifications with pending timers.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::attributes::NotificationAttributes;
use super::{NotificationError, NotificationId, NotificationResult};

/// Raw persistent string store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> NotificationResult<Option<String>>;

    /// Write `value` under `key`, overwriting any prior value
    fn put(&self, key: &str, value: &str) -> NotificationResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> NotificationResult<()>;

    fn keys(&self) -> NotificationResult<Vec<String>>;
}

/// Serializes notification attributes into a `KeyValueStore`, keyed by id
#[derive(Clone)]
pub struct AttributeStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeStore").finish_non_exhaustive()
    }
}

impl AttributeStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn save(&self, id: NotificationId, attributes: &NotificationAttributes) -> NotificationResult<()> {
        let record = serde_json::to_string(attributes).map_err(NotificationError::store)?;
        self.backend.put(&id.store_key(), &record)?;
        tracing::debug!(id = %id, record = %record, "Notification saved to store");
        Ok(())
    }

    /// Load the complete attribute set for `id`, or `NotFound`
    pub fn load(&self, id: NotificationId) -> NotificationResult<NotificationAttributes> {
        let record = self
            .backend
            .get(&id.store_key())?
            .ok_or(NotificationError::NotFound { id })?;
        let attributes = serde_json::from_str(&record).map_err(|e| {
            NotificationError::store(format!("corrupt record for notification {}: {}", id, e))
        })?;
        tracing::debug!(id = %id, record = %record, "Notification loaded from store");
        Ok(attributes)
    }

    pub fn contains(&self, id: NotificationId) -> NotificationResult<bool> {
        Ok(self.backend.get(&id.store_key())?.is_some())
    }

    pub fn delete(&self, id: NotificationId) -> NotificationResult<()> {
        self.backend.remove(&id.store_key())?;
        tracing::debug!(id = %id, "Notification deleted from store");
        Ok(())
    }

    /// Every id with a persisted record; keys that are not ids are skipped
    pub fn keys(&self) -> NotificationResult<BTreeSet<NotificationId>> {
        let mut ids = BTreeSet::new();
        for key in self.backend.keys()? {
            match key.parse::<NotificationId>() {
                Ok(id) => {
                    ids.insert(id);
                },
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping store key that is not a notification id");
                },
            }
        }
        Ok(ids)
    }
}
