// Linux D-Bus Notifications renderer

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use zbus::Connection;
use zbus::zvariant::Value;

use crate::components::{
    Alert, AlertRenderer, AlertStyle, NotificationError, NotificationId, NotificationResult,
    PlatformFuture, Progress,
};

/// Let the notification server pick the display timeout
const SERVER_DEFAULT_TIMEOUT: i32 = -1;

#[zbus::proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications",
    gen_blocking = false
)]
trait Notifications {
    /// Send a notification to the desktop notification daemon
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    /// Close a notification
    fn close_notification(&self, id: u32) -> zbus::Result<()>;
}

/// Renders alerts through `org.freedesktop.Notifications`
///
/// The server assigns its own ids; ours are mapped onto them so showing the
/// same notification id again replaces the visible alert instead of stacking.
pub struct LinuxRenderer {
    app_name: String,
    connection: Arc<OnceCell<Connection>>,
    server_ids: DashMap<NotificationId, u32>,
}

impl LinuxRenderer {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            connection: Arc::new(OnceCell::new()),
            server_ids: DashMap::new(),
        }
    }

    async fn proxy(&self) -> NotificationResult<NotificationsProxy<'static>> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                Connection::session().await.map_err(|e| {
                    NotificationError::render(format!("Failed to connect to D-Bus session: {:?}", e))
                })
            })
            .await?
            .clone();

        NotificationsProxy::new(&connection)
            .await
            .map_err(|e| NotificationError::render(format!("Failed to create D-Bus proxy: {:?}", e)))
    }

    async fn close(&self, server_id: u32) -> NotificationResult<()> {
        self.proxy()
            .await?
            .close_notification(server_id)
            .await
            .map_err(|e| NotificationError::render(format!("Failed to close D-Bus notification: {:?}", e)))
    }
}

/// Map notification priority (-2..=2) onto freedesktop urgency (0..=2)
pub fn urgency_for(priority: Option<i32>) -> u8 {
    match priority {
        Some(p) if p < 0 => 0,
        Some(p) if p > 0 => 2,
        _ => 1,
    }
}

/// Body text for the alert's style
pub fn body_for(alert: &Alert) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &alert.style {
        AlertStyle::BigText(text) => parts.push(text.clone()),
        AlertStyle::Inbox { title, summary, lines } => {
            if let Some(title) = title {
                parts.push(title.clone());
            }
            parts.extend(lines.iter().cloned());
            if let Some(summary) = summary {
                parts.push(summary.clone());
            }
        },
        AlertStyle::Plain | AlertStyle::BigPicture(_) => {
            if let Some(body) = &alert.body {
                parts.push(body.clone());
            }
        },
    }

    if let Some(sub_text) = &alert.sub_text {
        parts.push(sub_text.clone());
    }

    parts.join("\n")
}

/// Hints describing the alert to the notification server
pub fn hints_for<'a>(alert: &'a Alert, desktop_entry: &'a str) -> HashMap<&'static str, Value<'a>> {
    let mut hints = HashMap::new();

    hints.insert("urgency", Value::U8(urgency_for(alert.priority)));
    hints.insert("desktop-entry", Value::from(desktop_entry));

    if let Some(category) = &alert.category {
        hints.insert("category", Value::from(category.as_str()));
    }

    if let AlertStyle::BigPicture(image) = &alert.style {
        hints.insert("image-path", Value::from(image.path.to_string_lossy().into_owned()));
    }

    if !alert.auto_cancel {
        hints.insert("resident", Value::Bool(true));
    }

    if alert.defaults.sound {
        hints.insert("sound-name", Value::from("message-new-instant"));
    } else if let Some(sound) = &alert.sound_uri {
        hints.insert("sound-file", Value::from(sound.as_str()));
    }

    if let Some(Progress::Determinate { current, max }) = alert.progress {
        let percent = (i64::from(current) * 100 / i64::from(max.max(1))) as i32;
        hints.insert("value", Value::I32(percent));
    }

    hints
}

impl AlertRenderer for LinuxRenderer {
    fn show<'a>(&'a self, alert: &'a Alert) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let proxy = self.proxy().await?;
            let replaces_id = self.server_ids.get(&alert.id).map(|id| *id).unwrap_or(0);
            let hints = hints_for(alert, &self.app_name);
            let body = body_for(alert);
            let icon = alert.large_icon.as_deref().unwrap_or(alert.small_icon.as_str());
            let summary = alert.title.as_deref().unwrap_or_default();

            let server_id = proxy
                .notify(
                    &self.app_name,
                    replaces_id,
                    icon,
                    summary,
                    &body,
                    &["default", "Open"],
                    hints,
                    SERVER_DEFAULT_TIMEOUT,
                )
                .await
                .map_err(|e| NotificationError::render(format!("Failed to send D-Bus notification: {:?}", e)))?;

            self.server_ids.insert(alert.id, server_id);
            tracing::debug!(id = %alert.id, server_id, "D-Bus notification sent");
            Ok(())
        })
    }

    fn dismiss(&self, id: NotificationId) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            match self.server_ids.remove(&id) {
                Some((_, server_id)) => self.close(server_id).await,
                None => Ok(()),
            }
        })
    }

    fn dismiss_all(&self) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            let visible: Vec<(NotificationId, u32)> = self
                .server_ids
                .iter()
                .map(|entry| (*entry.key(), *entry.value()))
                .collect();

            for (id, server_id) in visible {
                self.server_ids.remove(&id);
                if let Err(e) = self.close(server_id).await {
                    tracing::warn!(id = %id, error = %e, "Failed to close D-Bus notification");
                }
            }
            Ok(())
        })
    }
}
