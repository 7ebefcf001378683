// Event surface the host drives: restart, timer fire and alert tap

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use super::alert::TapEvent;
use super::clock::{Clock, SystemClock};
use super::config::NotificationConfig;
use super::notification::NotificationServices;
use super::platform::AlertRenderer;
use super::publisher::PublishHandler;
use super::reconciler::{RebootReconciler, ReconcileReport};
use super::registry::NotificationRegistry;
use super::store::{AttributeStore, KeyValueStore};
use super::{NotificationId, NotificationResult};
use crate::backends::store::{JsonFileStore, MemoryStore};
use crate::backends::timer::TokioTimerService;

/// Capacity of the tap broadcast before slow subscribers start lagging
const TAP_CHANNEL_CAPACITY: usize = 64;

pub struct NotificationCenter {
    registry: Arc<NotificationRegistry>,
    reconciler: RebootReconciler,
    publisher: PublishHandler,
    taps: broadcast::Sender<TapEvent>,
    /// Tap that launched the app, held until the host removes it
    initial_tap: Mutex<Option<TapEvent>>,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("registry", &self.registry)
            .field("initial_tap", &*self.initial_tap.lock())
            .finish_non_exhaustive()
    }
}

impl NotificationCenter {
    pub fn new(services: NotificationServices) -> Self {
        let registry = Arc::new(NotificationRegistry::new(Arc::new(services)));
        let (taps, _) = broadcast::channel(TAP_CHANNEL_CAPACITY);
        Self {
            reconciler: RebootReconciler::new(registry.clone()),
            publisher: PublishHandler::new(registry.clone()),
            registry,
            taps,
            initial_tap: Mutex::new(None),
        }
    }

    /// Wire the default stack on the current tokio runtime
    ///
    /// Records go to `config.store_path` when set (in memory otherwise), timers
    /// run as tokio tasks, and their fires are dispatched on a spawned task.
    pub async fn start(
        config: NotificationConfig,
        renderer: Arc<dyn AlertRenderer>,
    ) -> NotificationResult<Arc<Self>> {
        let backend: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Arc::new(JsonFileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let timers = Arc::new(TokioTimerService::new(
            tokio::runtime::Handle::current(),
            clock.clone(),
            fired_tx,
        ));

        let services = NotificationServices::new(AttributeStore::new(backend), timers, renderer, clock, config);
        let center = Arc::new(Self::new(services));
        tokio::spawn(center.clone().dispatch_timer_events(fired_rx));

        tracing::info!("Notification center started");
        Ok(center)
    }

    pub fn registry(&self) -> &Arc<NotificationRegistry> {
        &self.registry
    }

    /// Device restart: re-arm every persisted notification
    pub async fn on_restart(&self) -> NotificationResult<ReconcileReport> {
        self.reconciler.reconcile().await
    }

    /// A timer fired for `id`
    pub async fn on_timer_fired(&self, id: NotificationId) {
        self.publisher.on_fire(id).await;
    }

    /// A rendered alert was tapped; forward it to subscribers
    ///
    /// With nobody subscribed the tap most likely launched the app, so it is
    /// kept as the initial tap.
    pub fn on_alert_tapped(&self, event: TapEvent) {
        tracing::info!(id = %event.id, action = ?event.action, "Notification tapped");
        if let Err(broadcast::error::SendError(event)) = self.taps.send(event) {
            self.set_initial_tap(event);
        }
    }

    pub fn subscribe_taps(&self) -> broadcast::Receiver<TapEvent> {
        self.taps.subscribe()
    }

    pub fn set_initial_tap(&self, event: TapEvent) {
        *self.initial_tap.lock() = Some(event);
    }

    pub fn initial_tap(&self) -> Option<TapEvent> {
        self.initial_tap.lock().clone()
    }

    pub fn remove_initial_tap(&self) -> Option<TapEvent> {
        self.initial_tap.lock().take()
    }

    /// Drain timer fires until the timer service goes away
    pub async fn dispatch_timer_events(self: Arc<Self>, mut fired: mpsc::UnboundedReceiver<NotificationId>) {
        while let Some(id) = fired.recv().await {
            self.on_timer_fired(id).await;
        }
        tracing::debug!("Timer event channel closed");
    }
}
