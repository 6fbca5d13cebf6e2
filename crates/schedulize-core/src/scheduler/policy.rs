//! Per-day minute budgets by assignment category.
//!
//! Projects are spread forward from today. Tests and homework are packed
//! into the days that end on the due date.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::AssignmentKind;

/// Share of a homework estimate given to the day before the due date.
const HOMEWORK_EARLY_SHARE: f64 = 0.66;
/// Share of a homework estimate given to the due date itself.
const HOMEWORK_LATE_SHARE: f64 = 0.34;

/// Target minutes for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTarget {
    pub date: NaiveDate,
    pub minutes: f64,
}

/// Ordered per-day targets. Order decides which days are served first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayBudget {
    days: Vec<DayTarget>,
}

impl DayBudget {
    pub fn new(days: Vec<DayTarget>) -> Self {
        Self { days }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayTarget> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_minutes(&self) -> f64 {
        self.days.iter().map(|d| d.minutes).sum()
    }

    pub fn as_slice(&self) -> &[DayTarget] {
        &self.days
    }
}

/// `ceil((due_at - now) / 1 day)`; zero or negative when already due.
pub fn days_until_due(now: DateTime<Utc>, due_at: DateTime<Utc>) -> i64 {
    let ms = (due_at - now).num_milliseconds();
    let day_ms = Duration::days(1).num_milliseconds();
    ms.div_euclid(day_ms) + i64::from(ms.rem_euclid(day_ms) != 0)
}

/// Allocation policy keyed on the assignment category.
#[derive(Debug, Clone, Copy)]
pub struct AllocationPolicy {
    kind: AssignmentKind,
}

impl AllocationPolicy {
    pub fn for_kind(kind: AssignmentKind) -> Self {
        Self { kind }
    }

    /// Split `estimated_minutes` over the days leading up to the due date.
    ///
    /// `today` and `due_day` are local dates. When `days_until_due <= 0`
    /// everything goes to `today`.
    pub fn budget(
        &self,
        estimated_minutes: f64,
        days_until_due: i64,
        today: NaiveDate,
        due_day: NaiveDate,
    ) -> DayBudget {
        if days_until_due <= 0 {
            return DayBudget::new(vec![DayTarget {
                date: today,
                minutes: estimated_minutes,
            }]);
        }

        let from_today = |offset: i64| today + Duration::days(offset);
        let last_day = due_day.max(today);
        // `back` days before the due date, never earlier than today.
        let before_due = |back: i64| (last_day - Duration::days(back)).max(today);

        let days = match self.kind {
            AssignmentKind::Test => {
                let span = days_until_due.min((estimated_minutes / 60.0).ceil().max(1.0) as i64);
                let total_weight = (span * (span + 1) / 2) as f64;
                (0..span)
                    .map(|i| DayTarget {
                        date: before_due(span - 1 - i),
                        minutes: (i + 1) as f64 / total_weight * estimated_minutes,
                    })
                    .collect()
            }
            AssignmentKind::Homework => {
                if days_until_due >= 2 {
                    vec![
                        DayTarget {
                            date: before_due(1),
                            minutes: HOMEWORK_EARLY_SHARE * estimated_minutes,
                        },
                        DayTarget {
                            date: last_day,
                            minutes: HOMEWORK_LATE_SHARE * estimated_minutes,
                        },
                    ]
                } else {
                    vec![DayTarget {
                        date: last_day,
                        minutes: estimated_minutes,
                    }]
                }
            }
            AssignmentKind::Project | AssignmentKind::Other => {
                let per_day = estimated_minutes / days_until_due as f64;
                (0..days_until_due)
                    .map(|i| DayTarget {
                        date: from_today(i),
                        minutes: per_day,
                    })
                    .collect()
            }
        };

        DayBudget::new(days)
    }
}
