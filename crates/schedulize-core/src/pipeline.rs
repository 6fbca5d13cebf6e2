//! End-to-end scheduling run against a calendar provider.
//!
//! A run is: one busy fetch, the pure plan, one insert per merged event
//! (sequential, chronological), one refresh fetch. Runs are serialized by
//! a pipeline-wide lock because each run computes availability from its own
//! fetch and nothing reserves slots between runs.

use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{CalendarError, ConfigError, ScheduleError};
use crate::integrations::traits::{BusySource, EventDraft, EventSink};
use crate::interval::BusyEvent;
use crate::schedule::{Assignment, Routine};
use crate::scheduler::{AutoScheduler, MergedEvent, SchedulePlan, SchedulerConfig};

/// Default deadline for each provider call.
pub const DEFAULT_CALL_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub plan: SchedulePlan,
    /// Events persisted, in the order they were created.
    pub created: Vec<MergedEvent>,
    /// Busy events fetched after persisting, for refreshing a view.
    pub refreshed: Vec<BusyEvent>,
}

impl ScheduleOutcome {
    pub fn shortfall_minutes(&self) -> f64 {
        self.plan.shortfall_minutes
    }
}

/// Serializes scheduling runs and applies provider timeouts.
pub struct SchedulingPipeline {
    scheduler: AutoScheduler,
    call_timeout: StdDuration,
    run_lock: Mutex<()>,
}

impl SchedulingPipeline {
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_timeout(config, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(config: SchedulerConfig, call_timeout: StdDuration) -> Self {
        Self {
            scheduler: AutoScheduler::with_config(config),
            call_timeout,
            run_lock: Mutex::new(()),
        }
    }

    pub fn scheduler(&self) -> &AutoScheduler {
        &self.scheduler
    }

    /// Schedule `assignment` into the calendar behind `busy_source`/`event_sink`.
    ///
    /// # Errors
    /// - [`ScheduleError::Config`] when `routine` is `None`; nothing is fetched.
    /// - [`ScheduleError::Fetch`] when the initial fetch fails.
    /// - [`ScheduleError::Persist`] when an insert fails; earlier inserts stay.
    /// - [`ScheduleError::Refresh`] when the final fetch fails.
    ///
    /// Insufficient free time is not an error; see
    /// [`SchedulePlan::shortfall_minutes`].
    pub async fn schedule_assignment<B, S>(
        &self,
        assignment: &Assignment,
        routine: Option<&Routine>,
        busy_source: &B,
        event_sink: &S,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, ScheduleError>
    where
        B: BusySource + ?Sized,
        S: EventSink + ?Sized,
    {
        let routine = routine.ok_or_else(|| ConfigError::RoutineMissing("routine not set".into()))?;

        let _guard = self.run_lock.lock().await;
        info!(
            assignment = %assignment.id,
            title = %assignment.title,
            kind = %assignment.kind,
            due_at = %assignment.due_at,
            "scheduling assignment"
        );

        // Busy events just outside [now, due] still reach in through the buffer.
        let buffer = self.scheduler.config().buffer();
        let time_min = now - buffer;
        let time_max = assignment.due_at.max(now) + buffer;
        let busy = self
            .call("fetch_busy", busy_source.fetch_busy(time_min, time_max))
            .await
            .map_err(|source| {
                error!(error = %source, "busy fetch failed");
                ScheduleError::Fetch { source }
            })?;

        let plan = self.scheduler.plan(assignment, routine, &busy, now);
        if plan.shortfall_minutes > 0.0 {
            warn!(
                assignment = %assignment.id,
                shortfall_minutes = plan.shortfall_minutes,
                placed_minutes = plan.placed_minutes,
                "not enough free time before the due date"
            );
        }

        let mut created = Vec::with_capacity(plan.events.len());
        let mut pending = plan.events.iter();
        while let Some(event) = pending.next() {
            let draft = EventDraft::for_block(assignment, event);
            if let Err(source) = self.call("insert_event", event_sink.insert_event(&draft)).await {
                error!(error = %source, start = %event.interval.start, "event insert failed");
                let failed = event.clone();
                let not_attempted: Vec<MergedEvent> = pending.cloned().collect();
                return Err(ScheduleError::Persist {
                    source,
                    plan,
                    created,
                    failed,
                    not_attempted,
                });
            }
            created.push(event.clone());
        }
        info!(created = created.len(), "events created");

        let refreshed = match self
            .call("fetch_busy", busy_source.fetch_busy(time_min, time_max))
            .await
        {
            Ok(events) => events,
            Err(source) => {
                error!(error = %source, "refresh fetch failed");
                return Err(ScheduleError::Refresh {
                    source,
                    plan,
                    created,
                });
            }
        };

        Ok(ScheduleOutcome {
            plan,
            created,
            refreshed,
        })
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T, CalendarError>
    where
        F: Future<Output = Result<T, CalendarError>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CalendarError::Timeout {
                operation: operation.to_string(),
                timeout_secs: self.call_timeout.as_secs(),
            }),
        }
    }
}
