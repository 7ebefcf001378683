// Notification entity: one id plus its attributes, with the lifecycle operations
// that orchestrate the store, the timer service and the alert renderer

use std::sync::Arc;

use super::alert::Alert;
use super::attributes::{NotificationAttributes, TimingMode};
use super::clock::{Clock, describe_millis};
use super::config::NotificationConfig;
use super::platform::{AlertRenderer, TimerAdapter};
use super::repeat::AlarmSchedule;
use super::store::AttributeStore;
use super::{NotificationError, NotificationId, NotificationResult};

/// Collaborators shared by every notification entity
pub struct NotificationServices {
    pub store: AttributeStore,
    pub timers: Arc<dyn TimerAdapter>,
    pub renderer: Arc<dyn AlertRenderer>,
    pub clock: Arc<dyn Clock>,
    pub config: NotificationConfig,
}

impl NotificationServices {
    pub fn new(
        store: AttributeStore,
        timers: Arc<dyn TimerAdapter>,
        renderer: Arc<dyn AlertRenderer>,
        clock: Arc<dyn Clock>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            store,
            timers,
            renderer,
            clock,
            config,
        }
    }
}

impl std::fmt::Debug for NotificationServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationServices")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A single notification, or a set of scheduled repeats of it
#[derive(Clone)]
pub struct Notification {
    id: NotificationId,
    attributes: NotificationAttributes,
    services: Arc<NotificationServices>,
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl Notification {
    pub fn new(
        id: NotificationId,
        attributes: NotificationAttributes,
        services: Arc<NotificationServices>,
    ) -> Self {
        Self {
            id,
            attributes,
            services,
        }
    }

    /// Reconstruct from the persisted record
    pub fn load(id: NotificationId, services: Arc<NotificationServices>) -> NotificationResult<Self> {
        let attributes = services.store.load(id)?;
        Ok(Self::new(id, attributes, services))
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn attributes(&self) -> &NotificationAttributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> NotificationAttributes {
        self.attributes
    }

    /// Show now, or arm the timer and persist
    pub async fn create(self) -> NotificationResult<Self> {
        let timing = self.attributes.timing()?;
        self.arm_and_save_or_show(timing).await?;
        tracing::info!(id = %self.id, "Notification created");
        Ok(self)
    }

    /// Replace the attributes and reset the schedule
    ///
    /// The new attributes are validated before anything is torn down, so a
    /// rejected update leaves the previous timer and record in place.
    pub async fn update(mut self, attributes: NotificationAttributes) -> NotificationResult<Self> {
        let timing = attributes.timing()?;
        self.delete().await?;
        self.attributes = attributes;
        self.arm_and_save_or_show(timing).await?;
        tracing::info!(id = %self.id, "Notification updated");
        Ok(self)
    }

    /// Cancel the timer, remove the visible alert and the persisted record
    pub async fn delete(&self) -> NotificationResult<&Self> {
        self.cancel_alarm();

        if let Err(e) = self.services.renderer.dismiss(self.id).await {
            tracing::warn!(id = %self.id, error = %e, "Failed to dismiss alert during delete");
        }

        self.services.store.delete(self.id)?;
        tracing::info!(id = %self.id, "Notification deleted");
        Ok(self)
    }

    /// Remove only the visible alert; future fires still occur
    pub async fn clear(&self) -> NotificationResult<&Self> {
        self.services.renderer.dismiss(self.id).await?;
        tracing::info!(id = %self.id, "Notification cleared");
        Ok(self)
    }

    /// Render and display the alert from the current attributes
    pub async fn show(&self) -> NotificationResult<()> {
        let alert = Alert::build(self.id, &self.attributes, &self.services.config).await;
        self.services.renderer.show(&alert).await?;
        tracing::info!(id = %self.id, "Notification shown");
        Ok(())
    }

    pub fn cancel_alarm(&self) {
        self.services.timers.cancel(self.id);
        tracing::debug!(id = %self.id, "Notification alarm cancelled");
    }

    /// Arm the timer for a delayed or scheduled notification without showing or persisting
    ///
    /// Returns `false` when the attributes are immediate and nothing was armed.
    pub fn arm(&self) -> NotificationResult<bool> {
        let timing = self.attributes.timing()?;
        self.arm_for(&timing)
    }

    fn arm_for(&self, timing: &TimingMode) -> NotificationResult<bool> {
        let Some(schedule) = AlarmSchedule::for_timing(timing, self.services.clock.as_ref()) else {
            return Ok(false);
        };

        self.services.timers.arm(self.id, schedule)?;

        match schedule {
            AlarmSchedule::Elapsed { at } => {
                tracing::info!(
                    id = %self.id,
                    delay_ms = self.attributes.delay,
                    fire_at_uptime = ?at,
                    "Notification delay alarm set"
                );
            },
            AlarmSchedule::Exact { at_ms } => {
                tracing::info!(
                    id = %self.id,
                    repeat_type = ?self.attributes.repeat_type,
                    send_at = %describe_millis(at_ms),
                    "One-time alarm set"
                );
            },
            AlarmSchedule::Repeating { first_ms, interval } => {
                tracing::info!(
                    id = %self.id,
                    repeat_type = ?self.attributes.repeat_type,
                    interval_ms = interval.as_millis() as u64,
                    send_at = %describe_millis(first_ms),
                    "Repeating alarm set"
                );
            },
        }

        Ok(true)
    }

    async fn arm_and_save_or_show(&self, timing: TimingMode) -> NotificationResult<()> {
        if !timing.is_pending() {
            return match self.show().await {
                Ok(()) => Ok(()),
                Err(NotificationError::RenderFailure { message }) => {
                    tracing::warn!(id = %self.id, error = %message, "Immediate notification could not be rendered");
                    Ok(())
                },
                Err(e) => Err(e),
            };
        }

        self.arm_for(&timing)?;

        // Every armed timer needs a record to publish from
        if let Err(e) = self.services.store.save(self.id, &self.attributes) {
            self.cancel_alarm();
            return Err(e);
        }

        Ok(())
    }
}
