// Platform backends: record stores, timers, image handling and alert renderers

pub mod image_utils;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod store;
pub mod timer;

use std::sync::Arc;

use crate::components::{Alert, AlertRenderer, NotificationConfig, NotificationId, PlatformFuture};

/// Renderer that only logs; used where no desktop notification service exists
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl AlertRenderer for LogRenderer {
    fn show<'a>(&'a self, alert: &'a Alert) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            tracing::info!(
                id = %alert.id,
                channel = %alert.channel.id,
                title = ?alert.title,
                "Notification shown"
            );
            Ok(())
        })
    }

    fn dismiss(&self, id: NotificationId) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            tracing::info!(id = %id, "Notification dismissed");
            Ok(())
        })
    }

    fn dismiss_all(&self) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            tracing::info!("All notifications dismissed");
            Ok(())
        })
    }
}

/// Renderer for the current OS
pub fn default_renderer(config: &NotificationConfig) -> Arc<dyn AlertRenderer> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(linux::LinuxRenderer::new(config.app_name.clone()))
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::debug!(app = %config.app_name, "No native renderer on this platform, logging alerts");
        Arc::new(LogRenderer)
    }
}
