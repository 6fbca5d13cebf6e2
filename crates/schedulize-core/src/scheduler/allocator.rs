//! Spends a [`DayBudget`] against available slots.
//!
//! Within a day the longest contiguous runs are used first, so work lands
//! in a few long blocks rather than many fragments. Day targets that cannot
//! be met are forfeited, not carried to another day; the shortfall is kept
//! in [`DayAllocation`].

use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::policy::DayBudget;
use crate::interval::TimeInterval;

/// Remaining amounts at or below this many minutes count as zero.
pub(crate) const MINUTE_EPSILON: f64 = 1e-6;

/// A piece of an available slot assigned to an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedSlot {
    pub assignment_id: String,
    pub interval: TimeInterval,
}

/// What happened to one day of the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayAllocation {
    pub date: NaiveDate,
    pub target_minutes: f64,
    pub placed_minutes: f64,
}

impl DayAllocation {
    /// Minutes of this day's target that found no slot.
    pub fn unmet_minutes(&self) -> f64 {
        let unmet = self.target_minutes - self.placed_minutes;
        if unmet > MINUTE_EPSILON {
            unmet
        } else {
            0.0
        }
    }
}

/// Output of [`SlotAllocator::allocate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub slots: Vec<AllocatedSlot>,
    pub days: Vec<DayAllocation>,
}

impl Allocation {
    pub fn placed_minutes(&self) -> f64 {
        self.slots.iter().map(|s| s.interval.minutes()).sum()
    }
}

/// Group chronologically sorted slots into maximal runs of touching slots.
pub fn group_runs(slots: &[TimeInterval]) -> Vec<Vec<TimeInterval>> {
    let mut runs: Vec<Vec<TimeInterval>> = Vec::new();
    for slot in slots {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|prev| prev.touches(slot)) => run.push(*slot),
            _ => runs.push(vec![*slot]),
        }
    }
    runs
}

fn run_length(run: &[TimeInterval]) -> Duration {
    run.iter().fold(Duration::zero(), |acc, s| acc + s.duration())
}

/// Allocates available slots to one assignment.
pub struct SlotAllocator {
    zone: FixedOffset,
}

impl SlotAllocator {
    /// `zone` decides which calendar date a slot belongs to.
    pub fn new(zone: FixedOffset) -> Self {
        Self { zone }
    }

    /// Place up to `total_minutes` of work for `assignment_id`.
    pub fn allocate(
        &self,
        assignment_id: &str,
        available: &[TimeInterval],
        budget: &DayBudget,
        total_minutes: f64,
    ) -> Allocation {
        let mut allocation = Allocation::default();
        let mut remaining_total = total_minutes;

        for target in budget.iter() {
            let mut day = DayAllocation {
                date: target.date,
                target_minutes: target.minutes,
                placed_minutes: 0.0,
            };

            if remaining_total > MINUTE_EPSILON {
                let mut day_slots: Vec<TimeInterval> = available
                    .iter()
                    .filter(|s| s.local_date(&self.zone) == target.date)
                    .copied()
                    .collect();
                day_slots.sort_by_key(|s| s.start);

                let mut runs = group_runs(&day_slots);
                // Stable: equal-length runs stay in chronological order.
                runs.sort_by(|a, b| run_length(b).cmp(&run_length(a)));

                let mut remaining_day = target.minutes;
                'runs: for run in &runs {
                    for slot in run {
                        if remaining_day <= MINUTE_EPSILON || remaining_total <= MINUTE_EPSILON {
                            break 'runs;
                        }
                        let take = slot.minutes().min(remaining_day).min(remaining_total);
                        let length = Duration::milliseconds((take * 60_000.0).floor() as i64);
                        if length <= Duration::zero() {
                            break 'runs;
                        }

                        allocation.slots.push(AllocatedSlot {
                            assignment_id: assignment_id.to_string(),
                            interval: TimeInterval {
                                start: slot.start,
                                end: slot.start + length,
                            },
                        });
                        remaining_day -= take;
                        remaining_total -= take;
                        day.placed_minutes += take;
                    }
                }
            }

            allocation.days.push(day);
        }

        allocation
    }
}
