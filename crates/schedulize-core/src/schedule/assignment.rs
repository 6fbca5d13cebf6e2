//! Assignments: the work items being scheduled.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::routine::parse_hhmm;
use crate::error::ValidationError;
use crate::interval::at_local;

/// Category of an assignment. Selects the allocation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Test,
    Homework,
    Project,
    /// Anything unrecognized lands here.
    #[serde(other)]
    Other,
}

impl AssignmentKind {
    /// Parse a category label, falling back to [`AssignmentKind::Other`].
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => AssignmentKind::Test,
            "homework" => AssignmentKind::Homework,
            "project" => AssignmentKind::Project,
            _ => AssignmentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Test => "test",
            AssignmentKind::Homework => "homework",
            AssignmentKind::Project => "project",
            AssignmentKind::Other => "other",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A work item with a due date and an estimated effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub kind: AssignmentKind,
    pub due_at: DateTime<Utc>,
    pub estimated_minutes: f64,
}

impl Assignment {
    /// Create an assignment with a fresh id.
    pub fn new(
        title: impl Into<String>,
        kind: AssignmentKind,
        due_at: DateTime<Utc>,
        estimated_minutes: f64,
    ) -> Result<Self, ValidationError> {
        if !estimated_minutes.is_finite() || estimated_minutes <= 0.0 {
            return Err(ValidationError::invalid(
                "estimated_minutes",
                format!("must be a positive number, got {estimated_minutes}"),
            ));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            kind,
            due_at,
            estimated_minutes,
        })
    }

    pub fn estimated_hours(&self) -> f64 {
        self.estimated_minutes / 60.0
    }

    /// Summary line used for created calendar events.
    pub fn event_title(&self) -> String {
        format!("Work on: {} ({})", self.title, self.kind)
    }

    /// Description used for created calendar events.
    pub fn event_description(&self) -> String {
        format!("Estimated time: {} hours", self.estimated_hours())
    }
}

/// Assignment as submitted by a form or a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentInput {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    /// `YYYY-MM-DD`
    pub due_date: String,
    /// `HH:MM`
    pub due_time: String,
    pub estimated_hours: f64,
}

impl AssignmentInput {
    /// Resolve the due date/time in `zone` and convert hours to minutes.
    pub fn into_assignment(self, zone: &FixedOffset) -> Result<Assignment, ValidationError> {
        let date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").map_err(|e| {
            ValidationError::invalid("due_date", format!("'{}' is not YYYY-MM-DD ({e})", self.due_date))
        })?;
        let time = parse_hhmm("due_time", &self.due_time)?;
        Assignment::new(
            self.title,
            self.kind,
            at_local(zone, date, time),
            self.estimated_hours * 60.0,
        )
    }
}
