//! Local notification scheduling core
//!
//! Notifications are described by a flat attribute set and either shown right
//! away, after a delay, or at a wall-clock time with an optional repeat interval.
//! Pending notifications are persisted so they can be re-armed after a restart;
//! timer fires render the stored attributes through a platform [`AlertRenderer`].
//!
//! [`NotificationCenter::start`] wires the default stack on the current tokio
//! runtime; [`NotificationModule`] exposes it as a JSON call surface.

pub mod backends;
pub mod components;

pub use backends::{LogRenderer, default_renderer};
pub use components::*;
