use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::interval::BusyEvent;
use crate::schedule::Assignment;
use crate::scheduler::MergedEvent;

/// An event to be created by an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Id of the assignment this block of work belongs to.
    pub assignment_id: String,
}

impl EventDraft {
    pub fn for_block(assignment: &Assignment, event: &MergedEvent) -> Self {
        Self {
            title: assignment.event_title(),
            description: assignment.event_description(),
            start: event.interval.start,
            end: event.interval.end,
            assignment_id: assignment.id.clone(),
        }
    }
}

/// Source of existing commitments. Implementations carry whatever session
/// or credentials they need; the scheduler never sees them.
#[async_trait]
pub trait BusySource: Send + Sync {
    /// Busy events overlapping `[time_min, time_max]`.
    async fn fetch_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyEvent>, CalendarError>;
}

/// Destination for scheduled work blocks.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Persist one event.
    async fn insert_event(&self, event: &EventDraft) -> Result<(), CalendarError>;
}
