pub mod config;
pub mod plan;
pub mod routine;
pub mod schedule;

use std::path::PathBuf;

use chrono::FixedOffset;
use clap::Args;
use schedulize_core::{AssignmentInput, AssignmentKind, MergedEvent};

/// Assignment given either as flags or as a JSON file.
#[derive(Args, Debug)]
pub struct AssignmentArgs {
    /// JSON file with title, type, due_date, due_time and estimated_hours
    #[arg(long, conflicts_with_all = ["title", "due_date", "hours"])]
    pub file: Option<PathBuf>,
    /// Assignment title
    #[arg(long, required_unless_present = "file")]
    pub title: Option<String>,
    /// test, homework, project or other
    #[arg(long = "type", value_name = "TYPE", default_value = "other")]
    pub kind: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long, required_unless_present = "file")]
    pub due_date: Option<String>,
    /// Due time (HH:MM)
    #[arg(long, default_value = "23:59")]
    pub due_time: String,
    /// Estimated effort in hours
    #[arg(long, required_unless_present = "file")]
    pub hours: Option<f64>,
}

impl AssignmentArgs {
    pub fn into_input(self) -> Result<AssignmentInput, Box<dyn std::error::Error>> {
        if let Some(path) = self.file {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            return Ok(serde_json::from_str(&content)?);
        }
        Ok(AssignmentInput {
            title: self.title.ok_or("--title is required")?,
            kind: AssignmentKind::from_label(&self.kind),
            due_date: self.due_date.ok_or("--due-date is required")?,
            due_time: self.due_time,
            estimated_hours: self.hours.ok_or("--hours is required")?,
        })
    }
}

/// One line per event, in the configured zone.
pub fn print_events(events: &[MergedEvent], zone: &FixedOffset) {
    for event in events {
        let start = event.interval.start.with_timezone(zone);
        let end = event.interval.end.with_timezone(zone);
        println!(
            "  {} {}-{} ({} min)",
            start.format("%Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            event.interval.duration().num_minutes()
        );
    }
}
