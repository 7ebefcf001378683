// Timer service on tokio tasks
// One task per armed id; a fire sends the id to the registered publish channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::components::{AlarmSchedule, Clock, NotificationId, NotificationResult, TimerAdapter};

struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct TokioTimerService {
    runtime: Handle,
    clock: Arc<dyn Clock>,
    fired: mpsc::UnboundedSender<NotificationId>,
    timers: Arc<DashMap<NotificationId, ArmedTimer>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for TokioTimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTimerService")
            .field("armed", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl TokioTimerService {
    pub fn new(
        runtime: Handle,
        clock: Arc<dyn Clock>,
        fired: mpsc::UnboundedSender<NotificationId>,
    ) -> Self {
        Self {
            runtime,
            clock,
            fired,
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn armed_count(&self) -> usize {
        self.timers.iter().filter(|timer| !timer.handle.is_finished()).count()
    }

    /// Entries held in the timer map, finished or not
    pub fn tracked_count(&self) -> usize {
        self.timers.len()
    }
}

impl TimerAdapter for TokioTimerService {
    fn arm(&self, id: NotificationId, schedule: AlarmSchedule) -> NotificationResult<()> {
        let start = Instant::now() + schedule.initial_delay(self.clock.as_ref());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let fired = self.fired.clone();
        let timers = self.timers.clone();

        // The slot stays locked until the new entry is in, so a zero-delay fire
        // cannot run its removal ahead of the insert
        let slot = self.timers.entry(id);
        let handle = self.runtime.spawn(async move {
            match schedule.interval() {
                None => {
                    tokio::time::sleep_until(start).await;
                    if fired.send(id).is_err() {
                        tracing::warn!(id = %id, "Timer fired with no publish handler attached");
                    }
                    timers.remove_if(&id, |_, armed| armed.generation == generation);
                },
                Some(period) => {
                    let mut ticks = tokio::time::interval_at(start, period);
                    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticks.tick().await;
                        if fired.send(id).is_err() {
                            tracing::warn!(id = %id, "Repeating timer has no publish handler, stopping");
                            timers.remove_if(&id, |_, armed| armed.generation == generation);
                            break;
                        }
                    }
                },
            }
        });

        let armed = ArmedTimer { generation, handle };
        match slot {
            Entry::Occupied(mut occupied) => occupied.insert(armed).handle.abort(),
            Entry::Vacant(vacant) => {
                vacant.insert(armed);
            },
        }
        Ok(())
    }

    fn cancel(&self, id: NotificationId) {
        if let Some((_, armed)) = self.timers.remove(&id) {
            armed.handle.abort();
        }
    }

    fn is_armed(&self, id: NotificationId) -> bool {
        self.timers
            .get(&id)
            .is_some_and(|armed| !armed.handle.is_finished())
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        for timer in self.timers.iter() {
            timer.handle.abort();
        }
    }
}
