//! # Schedulize Core Library
//!
//! This library places assignments (tests, homework, projects) into free
//! time on a calendar. Given a daily routine, the busy intervals already on
//! the calendar and an assignment with an estimate and a due date, it works
//! out where the work should go and returns the minimal set of events that
//! cover it.
//!
//! ## Architecture
//!
//! - **Schedule inputs**: typed routine (wake/sleep/meals) and assignments
//! - **Scheduler**: pure availability, allocation-policy, allocation and
//!   merge steps
//! - **Pipeline**: async fetch → plan → persist → refresh run against a
//!   calendar provider, one run at a time
//! - **Integrations**: Google Calendar implementation of the provider traits
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`AutoScheduler`]: Pure planning entry point
//! - [`SchedulingPipeline`]: Provider-facing scheduling entry point
//! - [`Config`]: Application configuration management
//! - [`BusySource`] / [`EventSink`]: Traits for calendar providers

pub mod error;
pub mod integrations;
pub mod interval;
pub mod pipeline;
pub mod schedule;
pub mod scheduler;
pub mod storage;

pub use error::{CalendarError, ConfigError, ScheduleError, ValidationError};
pub use integrations::{AccessToken, BusySource, EventDraft, EventSink, GoogleCalendar};
pub use interval::{BusyEvent, TimeInterval};
pub use pipeline::{ScheduleOutcome, SchedulingPipeline};
pub use schedule::{Assignment, AssignmentInput, AssignmentKind, Routine, RoutineInput};
pub use scheduler::{AutoScheduler, MergedEvent, SchedulePlan, SchedulerConfig};
pub use storage::Config;
