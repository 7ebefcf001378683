// Platform seams consumed by the core
// The alert primitive and the timer-interrupt service are injected so the core
// runs the same against a desktop backend, a device bridge, or test doubles.

use std::future::Future;
use std::pin::Pin;

use super::alert::Alert;
use super::repeat::AlarmSchedule;
use super::{NotificationId, NotificationResult};

/// Boxed future returned by async platform calls
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = NotificationResult<T>> + Send + 'a>>;

/// Platform alert-rendering primitive
pub trait AlertRenderer: Send + Sync {
    /// Display the alert, replacing any visible alert with the same id
    fn show<'a>(&'a self, alert: &'a Alert) -> PlatformFuture<'a, ()>;

    /// Remove the visible alert for `id`; a no-op when none is visible
    fn dismiss(&self, id: NotificationId) -> PlatformFuture<'_, ()>;

    /// Remove every visible alert owned by this application
    fn dismiss_all(&self) -> PlatformFuture<'_, ()>;
}

/// Platform timer-interrupt service
///
/// Fires are delivered to whatever publish callback the implementation was
/// registered with; the core only arms and cancels.
pub trait TimerAdapter: Send + Sync {
    /// Arm a timer for `id`, replacing any timer already armed for it
    fn arm(&self, id: NotificationId, schedule: AlarmSchedule) -> NotificationResult<()>;

    /// Cancel the timer for `id`; cancelling nothing is not an error
    fn cancel(&self, id: NotificationId);

    fn is_armed(&self, id: NotificationId) -> bool;
}
