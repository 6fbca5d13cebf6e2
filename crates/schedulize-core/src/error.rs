//! Core error types for schedulize-core.
//!
//! This module defines the error hierarchy using thiserror. The pure
//! scheduling functions only fail on validation; everything that talks to
//! a calendar provider reports [`CalendarError`], and the scheduling
//! pipeline wraps provider and configuration failures in [`ScheduleError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::scheduler::{MergedEvent, SchedulePlan};

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// The routine has not been set, or is missing a field
    #[error("Routine is not configured: {0}")]
    RoutineMissing(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised at the calendar provider boundary.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Calendar API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider payload could not be interpreted
    #[error("Malformed calendar response: {0}")]
    Malformed(String),

    /// Boundary call exceeded its deadline
    #[error("Calendar call '{operation}' timed out after {timeout_secs} seconds")]
    Timeout { operation: String, timeout_secs: u64 },

    /// Invalid request URL
    #[error("Invalid calendar URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors returned by the scheduling pipeline.
///
/// Persistence is not atomic: the `Persist` and `Refresh` variants carry
/// the events that were created before the failure so the caller can
/// decide whether to retry the remainder.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fetching busy intervals failed; nothing was persisted.
    #[error("Failed to fetch busy intervals: {source}")]
    Fetch {
        #[source]
        source: CalendarError,
    },

    /// Persisting one of the merged events failed.
    #[error(
        "Failed to persist event starting {failed_start}; {created_count} created, {skipped_count} not attempted: {source}",
        failed_start = .failed.interval.start,
        created_count = .created.len(),
        skipped_count = .not_attempted.len()
    )]
    Persist {
        #[source]
        source: CalendarError,
        plan: SchedulePlan,
        created: Vec<MergedEvent>,
        failed: MergedEvent,
        not_attempted: Vec<MergedEvent>,
    },

    /// All events were persisted but the refresh fetch failed.
    #[error("Events created but refresh failed: {source}")]
    Refresh {
        #[source]
        source: CalendarError,
        plan: SchedulePlan,
        created: Vec<MergedEvent>,
    },
}

impl ScheduleError {
    /// Events that were persisted before the pipeline stopped.
    pub fn created(&self) -> &[MergedEvent] {
        match self {
            ScheduleError::Persist { created, .. } | ScheduleError::Refresh { created, .. } => {
                created
            }
            _ => &[],
        }
    }
}
