//! Automatic scheduler for assignments.
//!
//! This module places an assignment's estimated effort into free time:
//! - Cuts the wake–sleep window of each day up to the due date into slots,
//!   avoiding buffered busy intervals and meals ([`AvailabilityCalculator`])
//! - Splits the estimate into per-day targets by category ([`AllocationPolicy`])
//! - Spends those targets on the longest contiguous runs ([`SlotAllocator`])
//! - Merges touching slots into calendar events ([`merge_slots`])
//!
//! Everything here is pure and synchronous; the I/O side lives in
//! [`crate::pipeline`].

pub mod allocator;
pub mod availability;
pub mod merge;
pub mod policy;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interval::{normalize_busy, BusyEvent, TimeInterval};
use crate::schedule::{Assignment, Routine};

pub use allocator::{group_runs, AllocatedSlot, Allocation, DayAllocation, SlotAllocator};
pub use availability::AvailabilityCalculator;
pub use merge::{merge_events, merge_slots, MergedEvent};
pub use policy::{days_until_due, AllocationPolicy, DayBudget, DayTarget};

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Slot length (minutes)
    pub granularity_minutes: i64,
    /// Margin kept free around busy intervals (minutes)
    pub buffer_minutes: i64,
    /// Length of each meal window (minutes)
    pub meal_minutes: i64,
    /// Zone used for calendar dates and wall-clock times
    pub zone: FixedOffset,
}

impl SchedulerConfig {
    pub fn granularity(&self) -> Duration {
        Duration::minutes(self.granularity_minutes)
    }

    pub fn buffer(&self) -> Duration {
        Duration::minutes(self.buffer_minutes)
    }

    pub fn meal_length(&self) -> Duration {
        Duration::minutes(self.meal_minutes)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: 15,
            buffer_minutes: 10,
            meal_minutes: 60,
            zone: Utc.fix(),
        }
    }
}

/// Result of one pure scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub assignment_id: String,
    /// Events to create, in chronological order.
    pub events: Vec<MergedEvent>,
    /// Per-day targets and what was placed against them.
    pub days: Vec<DayAllocation>,
    pub available_slots: usize,
    pub estimated_minutes: f64,
    pub placed_minutes: f64,
    /// Estimated minutes that could not be placed before the due date.
    pub shortfall_minutes: f64,
}

impl SchedulePlan {
    pub fn is_complete(&self) -> bool {
        self.shortfall_minutes <= 0.0
    }

    pub fn intervals(&self) -> Vec<TimeInterval> {
        self.events.iter().map(|e| e.interval).collect()
    }
}

/// Automatic scheduler for assignments
#[derive(Debug, Clone, Default)]
pub struct AutoScheduler {
    config: SchedulerConfig,
}

impl AutoScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Plan an assignment against raw provider busy events.
    pub fn plan(
        &self,
        assignment: &Assignment,
        routine: &Routine,
        busy: &[BusyEvent],
        now: DateTime<Utc>,
    ) -> SchedulePlan {
        let intervals = normalize_busy(busy, &self.config.zone);
        self.plan_with_intervals(assignment, routine, &intervals, now)
    }

    /// Plan an assignment against already normalized busy intervals.
    pub fn plan_with_intervals(
        &self,
        assignment: &Assignment,
        routine: &Routine,
        busy: &[TimeInterval],
        now: DateTime<Utc>,
    ) -> SchedulePlan {
        let available = AvailabilityCalculator::new(self.config).compute(
            busy,
            routine,
            assignment.due_at,
            now,
        );

        let today = now.with_timezone(&self.config.zone).date_naive();
        let due_day = assignment.due_at.with_timezone(&self.config.zone).date_naive();
        let budget = AllocationPolicy::for_kind(assignment.kind).budget(
            assignment.estimated_minutes,
            days_until_due(now, assignment.due_at),
            today,
            due_day,
        );
        debug!(
            assignment = %assignment.id,
            slots = available.len(),
            budget_days = budget.len(),
            "computed availability and budget"
        );

        let allocation = SlotAllocator::new(self.config.zone).allocate(
            &assignment.id,
            &available,
            &budget,
            assignment.estimated_minutes,
        );
        let placed_minutes = allocation.placed_minutes();
        let events = merge_slots(&allocation.slots);

        let shortfall = assignment.estimated_minutes - placed_minutes;
        SchedulePlan {
            assignment_id: assignment.id.clone(),
            events,
            days: allocation.days,
            available_slots: available.len(),
            estimated_minutes: assignment.estimated_minutes,
            placed_minutes,
            shortfall_minutes: if shortfall > allocator::MINUTE_EPSILON {
                shortfall
            } else {
                0.0
            },
        }
    }
}
