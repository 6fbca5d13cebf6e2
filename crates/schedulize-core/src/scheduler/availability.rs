//! Free-slot generation.
//!
//! Walks every calendar day from `now` to the due date and cuts each day's
//! wake–sleep window into fixed-size slots, dropping any slot that touches
//! a buffered busy interval or a meal window.

use chrono::{DateTime, Utc};

use super::SchedulerConfig;
use crate::interval::{round_up, TimeInterval};
use crate::schedule::Routine;

/// Produces the ordered list of available slots for one scheduling run.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityCalculator {
    config: SchedulerConfig,
}

impl AvailabilityCalculator {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Compute available slots between `now` and `due_at`.
    ///
    /// # Arguments
    /// * `busy` - Normalized busy intervals, in any order
    /// * `routine` - Wake/sleep and meal times
    /// * `due_at` - Nothing is placed at or after this instant
    /// * `now` - Nothing is placed before this instant
    ///
    /// # Returns
    /// Chronologically ordered, pairwise disjoint slots of exactly
    /// `granularity` length.
    pub fn compute(
        &self,
        busy: &[TimeInterval],
        routine: &Routine,
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<TimeInterval> {
        let zone = self.config.zone;
        let granularity = self.config.granularity();
        let mut slots = Vec::new();

        if granularity <= chrono::Duration::zero() {
            return slots;
        }

        let buffered: Vec<TimeInterval> = busy
            .iter()
            .map(|b| b.expanded(self.config.buffer()))
            .collect();

        let first_day = now.with_timezone(&zone).date_naive();
        let due_day = due_at.with_timezone(&zone).date_naive();

        for date in first_day.iter_days().take_while(|d| *d <= due_day) {
            let (day_start, day_end) = routine.day_window(date, &zone);
            // Windows that run past midnight can reach into the due date too.
            let day_end = day_end.min(due_at);

            let meals = routine.meal_windows(date, &zone, self.config.meal_length());
            let mut cursor = round_up(day_start.max(now), granularity, &zone);

            loop {
                let candidate = TimeInterval {
                    start: cursor,
                    end: cursor + granularity,
                };
                if candidate.end > day_end {
                    break;
                }

                let conflicts = buffered.iter().any(|b| candidate.overlaps(b))
                    || meals.iter().any(|m| candidate.overlaps(m));
                if !conflicts {
                    slots.push(candidate);
                }

                cursor = candidate.end;
            }
        }

        slots
    }
}
