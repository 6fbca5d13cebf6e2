//! Half-open time intervals and busy-event normalization.
//!
//! Every timestamp in the scheduler is stored in UTC. Wall-clock concepts
//! (calendar dates, wake times, all-day events) are resolved against an
//! explicit [`FixedOffset`] zone so day boundaries never depend on the
//! machine's local time zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A `[start, end)` interval with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in (possibly fractional) minutes.
    pub fn minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }

    /// Two half-open intervals overlap iff each starts before the other ends.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Grow the interval by `margin` on both sides.
    pub fn expanded(&self, margin: Duration) -> TimeInterval {
        TimeInterval {
            start: self.start - margin,
            end: self.end + margin,
        }
    }

    /// `true` when `next` begins exactly where this interval ends.
    pub fn touches(&self, next: &TimeInterval) -> bool {
        self.end == next.start
    }

    /// Calendar date of the interval's start in `zone`.
    pub fn local_date(&self, zone: &FixedOffset) -> NaiveDate {
        self.start.with_timezone(zone).date_naive()
    }
}

/// A busy interval as reported by a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusyEvent {
    /// Event with explicit start/end timestamps.
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// All-day event; `end_date` is exclusive.
    AllDay {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

impl BusyEvent {
    /// Convert to a [`TimeInterval`] in `zone`.
    ///
    /// All-day events span local midnight to local midnight. An all-day
    /// event whose end date does not come after its start date covers its
    /// start date only. Timed events with `end <= start` yield `None`.
    pub fn normalize(&self, zone: &FixedOffset) -> Option<TimeInterval> {
        match self {
            BusyEvent::Timed { start, end } => TimeInterval::new(*start, *end).ok(),
            BusyEvent::AllDay {
                start_date,
                end_date,
            } => {
                let last = if end_date > start_date {
                    *end_date
                } else {
                    start_date.succ_opt()?
                };
                TimeInterval::new(
                    local_to_utc(zone, start_date.and_time(NaiveTime::MIN)),
                    local_to_utc(zone, last.and_time(NaiveTime::MIN)),
                )
                .ok()
            }
        }
    }
}

/// Normalize a batch of busy events, dropping degenerate ones.
pub fn normalize_busy(events: &[BusyEvent], zone: &FixedOffset) -> Vec<TimeInterval> {
    events.iter().filter_map(|e| e.normalize(zone)).collect()
}

/// Resolve a wall-clock date-time in `zone` to UTC.
pub fn local_to_utc(zone: &FixedOffset, local: NaiveDateTime) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(zone.local_minus_utc()))).and_utc()
}

/// Wall-clock `time` on `date` in `zone`, as UTC.
pub fn at_local(zone: &FixedOffset, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    local_to_utc(zone, date.and_time(time))
}

/// Round `instant` up to the next multiple of `quantum`, counted from local
/// midnight in `zone`. Instants already on a boundary are returned unchanged.
pub fn round_up(instant: DateTime<Utc>, quantum: Duration, zone: &FixedOffset) -> DateTime<Utc> {
    let step = quantum.num_seconds();
    if step <= 0 {
        return instant;
    }
    let midnight = at_local(zone, instant.with_timezone(zone).date_naive(), NaiveTime::MIN);
    let elapsed = instant - midnight;
    let rem = elapsed.num_seconds().rem_euclid(step);
    let sub = i64::from(elapsed.subsec_nanos());
    if rem == 0 && sub == 0 {
        return instant;
    }
    instant - Duration::seconds(rem) - Duration::nanoseconds(sub) + quantum
}
