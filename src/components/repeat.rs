// Repeat policy: maps a scheduled notification's repeatType onto a timer schedule

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::attributes::TimingMode;
use super::clock::Clock;
use super::{NotificationError, NotificationResult};

const MINUTE: Duration = Duration::from_millis(60_000);
const HOUR: Duration = Duration::from_millis(60 * 60_000);
const HALF_DAY: Duration = Duration::from_millis(12 * 60 * 60_000);
const DAY: Duration = Duration::from_millis(24 * 60 * 60_000);

/// Recognized repeat kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatType {
    /// Custom interval carried from `repeatTime`
    Time(Duration),
    Minute,
    Hour,
    HalfDay,
    Day,
    Week,
    Month,
    Year,
}

impl RepeatType {
    /// Parse a raw `repeatType`; unrecognized values mean one-shot
    pub fn parse(repeat_type: &str, repeat_time: Option<i64>) -> NotificationResult<Option<Self>> {
        let parsed = match repeat_type {
            "time" => {
                let millis = repeat_time.ok_or_else(|| {
                    NotificationError::malformed("repeatTime", "repeatType \"time\" requires repeatTime")
                })?;
                if millis <= 0 {
                    return Err(NotificationError::malformed(
                        "repeatTime",
                        format!("repeat interval must be positive, got {}", millis),
                    ));
                }
                RepeatType::Time(Duration::from_millis(millis as u64))
            },
            "minute" => RepeatType::Minute,
            "hour" => RepeatType::Hour,
            "halfDay" => RepeatType::HalfDay,
            "day" => RepeatType::Day,
            "week" => RepeatType::Week,
            "month" => RepeatType::Month,
            "year" => RepeatType::Year,
            other => {
                tracing::debug!(repeat_type = other, "Unrecognized repeat type, scheduling one-shot");
                return Ok(None);
            },
        };
        Ok(Some(parsed))
    }

    /// Interval between fires after the first
    ///
    /// Week, month and year collapse to a flat day. That is the established
    /// behavior and is kept until calendar-aware recurrence is a product decision.
    pub fn interval(&self) -> Duration {
        match self {
            RepeatType::Time(interval) => *interval,
            RepeatType::Minute => MINUTE,
            RepeatType::Hour => HOUR,
            RepeatType::HalfDay => HALF_DAY,
            RepeatType::Day | RepeatType::Week | RepeatType::Month | RepeatType::Year => DAY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RepeatType::Time(_) => "time",
            RepeatType::Minute => "minute",
            RepeatType::Hour => "hour",
            RepeatType::HalfDay => "halfDay",
            RepeatType::Day => "day",
            RepeatType::Week => "week",
            RepeatType::Month => "month",
            RepeatType::Year => "year",
        }
    }
}

/// What the timer service is asked to arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmSchedule {
    /// One-shot at an uptime offset
    Elapsed { at: Duration },
    /// One-shot at absolute epoch milliseconds
    Exact { at_ms: i64 },
    /// First fire at `first_ms`, then every `interval`
    Repeating { first_ms: i64, interval: Duration },
}

impl AlarmSchedule {
    /// Compute the schedule for a pending timing mode; `None` for immediate
    pub fn for_timing(timing: &TimingMode, clock: &dyn Clock) -> Option<Self> {
        match *timing {
            TimingMode::Immediate => None,
            TimingMode::Delayed { delay } => Some(AlarmSchedule::Elapsed {
                at: clock.uptime() + delay,
            }),
            TimingMode::Scheduled { send_at, repeat } => Some(match repeat {
                None => AlarmSchedule::Exact { at_ms: send_at },
                Some(repeat) => AlarmSchedule::Repeating {
                    first_ms: send_at,
                    interval: repeat.interval(),
                },
            }),
        }
    }

    pub fn is_repeating(&self) -> bool {
        matches!(self, AlarmSchedule::Repeating { .. })
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            AlarmSchedule::Repeating { interval, .. } => Some(*interval),
            _ => None,
        }
    }

    /// Time until the first fire
    ///
    /// One-shot targets in the past yield zero. A repeating schedule whose first
    /// fire has passed waits for the next `first_ms + k * interval`, so re-arming
    /// after a restart keeps the original phase.
    pub fn initial_delay(&self, clock: &dyn Clock) -> Duration {
        let now = clock.now_millis();
        match *self {
            AlarmSchedule::Elapsed { at } => at.saturating_sub(clock.uptime()),
            AlarmSchedule::Exact { at_ms } => until(at_ms, now),
            AlarmSchedule::Repeating { first_ms, interval } if first_ms < now => {
                let period = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
                if period <= 0 {
                    return Duration::ZERO;
                }
                let behind = now.saturating_sub(first_ms) % period;
                Duration::from_millis(((period - behind) % period) as u64)
            },
            AlarmSchedule::Repeating { first_ms, .. } => until(first_ms, now),
        }
    }
}

fn until(at_ms: i64, now: i64) -> Duration {
    Duration::from_millis(at_ms.saturating_sub(now).max(0) as u64)
}
