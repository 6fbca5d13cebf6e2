//! Property tests for the pure scheduling steps.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;

use schedulize_core::scheduler::{
    days_until_due, merge_events, merge_slots, AllocatedSlot, AllocationPolicy,
    AvailabilityCalculator, SchedulerConfig, SlotAllocator,
};
use schedulize_core::{AssignmentKind, Routine, TimeInterval};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 0, 0, 0).unwrap()
}

fn hm(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60 % 24, minutes % 60, 0).unwrap()
}

prop_compose! {
    fn arb_routine()(
        wake in 0u32..96,
        sleep in 0u32..96,
        meals in prop::collection::vec(0u32..96, 0..3),
    ) -> Routine {
        let mut meal_times: Vec<_> = meals.into_iter().map(|m| hm(m * 15)).collect();
        meal_times.sort();
        Routine::new(hm(wake * 15), hm(sleep * 15), meal_times)
    }
}

prop_compose! {
    fn arb_busy()(
        raw in prop::collection::vec((0i64..(4 * 24 * 60), 1i64..240), 0..8),
    ) -> Vec<TimeInterval> {
        raw.into_iter()
            .map(|(start, len)| {
                let s = base() + Duration::minutes(start);
                TimeInterval::new(s, s + Duration::minutes(len)).unwrap()
            })
            .collect()
    }
}

prop_compose! {
    fn arb_allocated()(
        raw in prop::collection::vec((0i64..400, 1i64..=15), 0..40),
    ) -> Vec<AllocatedSlot> {
        let mut quarters: Vec<(i64, i64)> = raw;
        quarters.sort_by_key(|(q, _)| *q);
        quarters.dedup_by_key(|(q, _)| *q);
        quarters
            .into_iter()
            .map(|(q, len)| {
                let s = base() + Duration::minutes(q * 15);
                AllocatedSlot {
                    assignment_id: "a".into(),
                    interval: TimeInterval::new(s, s + Duration::minutes(len)).unwrap(),
                }
            })
            .collect()
    }
}

fn total(intervals: impl Iterator<Item = TimeInterval>) -> Duration {
    intervals.fold(Duration::zero(), |acc, i| acc + i.duration())
}

proptest! {
    #[test]
    fn available_slots_respect_all_constraints(
        routine in arb_routine(),
        busy in arb_busy(),
        now_offset in 0i64..(24 * 60),
        due_offset in 0i64..(4 * 24 * 60),
        zone_hours in -11i32..=12,
    ) {
        let zone = FixedOffset::east_opt(zone_hours * 3600).unwrap();
        let config = SchedulerConfig { zone, ..SchedulerConfig::default() };
        let now = base() + Duration::minutes(now_offset) + Duration::seconds(17);
        let due = base() + Duration::minutes(due_offset);

        let slots = AvailabilityCalculator::new(config).compute(&busy, &routine, due, now);

        for slot in &slots {
            prop_assert_eq!(slot.duration(), Duration::minutes(15));
            prop_assert!(slot.start >= now);
            prop_assert!(slot.end <= due);
            for b in &busy {
                prop_assert!(!slot.overlaps(&b.expanded(Duration::minutes(10))));
            }

            let date = slot.local_date(&zone);
            let in_window = [date.pred_opt().unwrap(), date].iter().any(|d| {
                let (start, end) = routine.day_window(*d, &zone);
                let meals = routine.meal_windows(*d, &zone, Duration::minutes(60));
                slot.start >= start
                    && slot.end <= end
                    && meals.iter().all(|m| !slot.overlaps(m))
            });
            prop_assert!(in_window, "slot {:?} outside any routine window", slot);
        }

        for pair in slots.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn merge_preserves_coverage(slots in arb_allocated()) {
        let merged = merge_slots(&slots);
        prop_assert!(merged.len() <= slots.len());
        prop_assert_eq!(
            total(merged.iter().map(|e| e.interval)),
            total(slots.iter().map(|s| s.interval))
        );
        for pair in merged.windows(2) {
            prop_assert!(pair[0].interval.end < pair[1].interval.start);
        }
    }

    #[test]
    fn merge_is_idempotent(slots in arb_allocated()) {
        let merged = merge_slots(&slots);
        prop_assert_eq!(merge_events(&merged), merged);
    }

    #[test]
    fn allocation_stays_within_slots_and_estimate(
        routine in arb_routine(),
        busy in arb_busy(),
        estimate in 1.0f64..2000.0,
        kind_idx in 0usize..4,
        due_offset in (24 * 60i64)..(4 * 24 * 60),
    ) {
        let kind = [
            AssignmentKind::Test,
            AssignmentKind::Homework,
            AssignmentKind::Project,
            AssignmentKind::Other,
        ][kind_idx];
        let config = SchedulerConfig::default();
        let now = base() + Duration::hours(7);
        let due = base() + Duration::minutes(due_offset);

        let available = AvailabilityCalculator::new(config).compute(&busy, &routine, due, now);
        let budget = AllocationPolicy::for_kind(kind).budget(
            estimate,
            days_until_due(now, due),
            now.date_naive(),
            due.date_naive(),
        );
        prop_assert!((budget.total_minutes() - estimate).abs() < 1e-6);

        let allocation = SlotAllocator::new(config.zone).allocate("a", &available, &budget, estimate);

        prop_assert!(allocation.placed_minutes() <= estimate + 1e-9);
        for slot in &allocation.slots {
            let source = available.iter().find(|a| a.start == slot.interval.start);
            prop_assert!(source.is_some());
            prop_assert!(slot.interval.end <= source.unwrap().end);
        }
        for day in &allocation.days {
            prop_assert!(day.placed_minutes <= day.target_minutes + 1e-6);
        }
    }
}
