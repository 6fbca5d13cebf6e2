use chrono::Utc;
use clap::Args;
use schedulize_core::{
    AccessToken, Config, ConfigError, GoogleCalendar, ScheduleError, SchedulingPipeline,
};

use super::{print_events, AssignmentArgs};

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub assignment: AssignmentArgs,
    /// Google OAuth access token with calendar scope
    #[arg(long, env = "SCHEDULIZE_GOOGLE_TOKEN", hide_env_values = true)]
    pub token: String,
    /// Calendar id (defaults to google.calendar_id from config)
    #[arg(long)]
    pub calendar: Option<String>,
    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ScheduleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scheduler_config = config.scheduler_config()?;
    let zone = scheduler_config.zone;
    let routine = match config.routine() {
        Ok(routine) => Some(routine),
        Err(ConfigError::RoutineMissing(_)) => None,
        Err(e) => return Err(e.into()),
    };
    let assignment = args.assignment.into_input()?.into_assignment(&zone)?;

    let calendar = GoogleCalendar::new(AccessToken::new(args.token))?
        .with_base_url(&config.google.base_url)?
        .with_calendar_id(args.calendar.unwrap_or_else(|| config.google.calendar_id.clone()));
    let pipeline = SchedulingPipeline::with_timeout(scheduler_config, config.call_timeout());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(pipeline.schedule_assignment(
        &assignment,
        routine.as_ref(),
        &calendar,
        &calendar,
        Utc::now(),
    ));

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            report_partial(&e, &zone);
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "created {} event(s) in calendar '{}':",
        outcome.created.len(),
        calendar.calendar_id()
    );
    print_events(&outcome.created, &zone);
    if outcome.shortfall_minutes() > 0.0 {
        println!(
            "shortfall: {:.0} of {:.0} min could not be placed before the due date",
            outcome.shortfall_minutes(),
            outcome.plan.estimated_minutes
        );
    }
    Ok(())
}

/// Events already written stay in the calendar; list them so the user can
/// clean up or retry the rest.
fn report_partial(err: &ScheduleError, zone: &chrono::FixedOffset) {
    if let ScheduleError::Persist { not_attempted, .. } = err {
        let created = err.created();
        println!(
            "created {} event(s) before the failure, {} not attempted:",
            created.len(),
            not_attempted.len()
        );
        print_events(created, zone);
    } else if !err.created().is_empty() {
        println!("created {} event(s):", err.created().len());
        print_events(err.created(), zone);
    }
}
