// JSON bridge facade
// Every call answers with either the reflected attribute set or an error message;
// nothing escapes this boundary as a panic or a partial success.

use std::sync::Arc;

use serde_json::Value;

use super::attributes::NotificationAttributes;
use super::center::NotificationCenter;
use super::notification::Notification;
use super::{NotificationId, NotificationResult};

/// Result shape handed across the bridge
pub type BridgeResult<T> = Result<T, String>;

#[derive(Debug, Clone)]
pub struct NotificationModule {
    center: Arc<NotificationCenter>,
}

impl NotificationModule {
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self { center }
    }

    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    pub async fn create_or_update(&self, id: i32, attributes: Value) -> BridgeResult<Value> {
        let result = async {
            let attributes = NotificationAttributes::from_json_value(attributes)?;
            let notification = self
                .center
                .registry()
                .create_or_update(NotificationId::new(id), attributes)
                .await?;
            reflect(&notification)
        }
        .await;
        respond("createOrUpdate", result)
    }

    pub async fn get_ids(&self) -> BridgeResult<Vec<i32>> {
        let result = self
            .center
            .registry()
            .ids()
            .map(|ids| ids.into_iter().map(NotificationId::get).collect());
        respond("getIDs", result)
    }

    pub async fn find(&self, id: i32) -> BridgeResult<Value> {
        let result = match self.center.registry().find(NotificationId::new(id)).await {
            Ok(notification) => reflect(&notification),
            Err(e) => Err(e),
        };
        respond("find", result)
    }

    pub async fn delete(&self, id: i32) -> BridgeResult<Value> {
        let result = match self.center.registry().delete(NotificationId::new(id)).await {
            Ok(notification) => reflect(&notification),
            Err(e) => Err(e),
        };
        respond("delete", result)
    }

    /// Best effort per id; per-id failures are logged, never returned
    pub async fn delete_all(&self) -> BridgeResult<()> {
        let result = self.center.registry().delete_all().await.map(|_| ());
        respond("deleteAll", result)
    }

    pub async fn clear(&self, id: i32) -> BridgeResult<Value> {
        let result = match self.center.registry().clear(NotificationId::new(id)).await {
            Ok(notification) => reflect(&notification),
            Err(e) => Err(e),
        };
        respond("clear", result)
    }

    pub async fn clear_all(&self) -> BridgeResult<()> {
        respond("clearAll", self.center.registry().clear_all().await)
    }
}

fn reflect(notification: &Notification) -> NotificationResult<Value> {
    notification.attributes().to_json_value()
}

fn respond<T>(method: &str, result: NotificationResult<T>) -> BridgeResult<T> {
    result.map_err(|e| {
        tracing::error!(method, error = %e, "Bridge call failed");
        e.to_string()
    })
}
