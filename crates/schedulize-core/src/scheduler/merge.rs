//! Coalesces touching allocated slots into calendar events.

use serde::{Deserialize, Serialize};

use super::allocator::AllocatedSlot;
use crate::interval::TimeInterval;

/// A maximal block of contiguous work, ready to become a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedEvent {
    pub assignment_id: String,
    pub interval: TimeInterval,
}

impl From<AllocatedSlot> for MergedEvent {
    fn from(slot: AllocatedSlot) -> Self {
        Self {
            assignment_id: slot.assignment_id,
            interval: slot.interval,
        }
    }
}

/// Merge slots whose boundaries touch exactly.
///
/// Output is sorted by start and never longer than the input; the total
/// covered time is unchanged.
pub fn merge_slots(slots: &[AllocatedSlot]) -> Vec<MergedEvent> {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|s| s.interval.start);

    let mut merged: Vec<MergedEvent> = Vec::with_capacity(sorted.len());
    for slot in sorted {
        match merged.last_mut() {
            Some(current)
                if current.assignment_id == slot.assignment_id
                    && current.interval.touches(&slot.interval) =>
            {
                current.interval.end = slot.interval.end;
            }
            _ => merged.push(slot.into()),
        }
    }
    merged
}

/// Re-merge already merged events; a merged sequence is a fixed point.
pub fn merge_events(events: &[MergedEvent]) -> Vec<MergedEvent> {
    let slots: Vec<AllocatedSlot> = events
        .iter()
        .map(|e| AllocatedSlot {
            assignment_id: e.assignment_id.clone(),
            interval: e.interval,
        })
        .collect();
    merge_slots(&slots)
}
