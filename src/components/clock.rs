use std::time::{Duration, Instant};

/// Time source for scheduling decisions
///
/// Delayed notifications are measured on the monotonic uptime clock, which is
/// unaffected by wall-clock changes but restarts on reboot. Scheduled
/// notifications are absolute wall-clock epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since the clock's origin
    fn uptime(&self) -> Duration;

    /// Wall-clock time as epoch milliseconds
    fn now_millis(&self) -> i64;
}

/// Clock backed by `Instant` and `chrono::Utc`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Clock for SystemClock {
    fn uptime(&self) -> Duration {
        self.origin.elapsed()
    }

    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Render epoch milliseconds for log lines
pub(crate) fn describe_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| format!("{}ms", millis))
}
