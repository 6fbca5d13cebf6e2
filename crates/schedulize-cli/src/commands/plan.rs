use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use schedulize_core::{AutoScheduler, BusyEvent, Config};

use super::{print_events, AssignmentArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub assignment: AssignmentArgs,
    /// JSON array of busy events ({"kind": "timed", "start", "end"} or
    /// {"kind": "all_day", "start_date", "end_date"})
    #[arg(long)]
    pub busy: Option<PathBuf>,
    /// Plan as of this instant (RFC 3339) instead of the current time
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
    /// Output the full plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scheduler_config = config.scheduler_config()?;
    let routine = config.routine()?;
    let assignment = args
        .assignment
        .into_input()?
        .into_assignment(&scheduler_config.zone)?;

    let busy: Vec<BusyEvent> = match &args.busy {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&content)?
        }
        None => Vec::new(),
    };
    let now = args.now.unwrap_or_else(Utc::now);

    let plan = AutoScheduler::with_config(scheduler_config).plan(&assignment, &routine, &busy, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} ({}, due {})",
        assignment.title,
        assignment.kind,
        assignment.due_at.with_timezone(&scheduler_config.zone)
    );
    println!("{} event(s):", plan.events.len());
    print_events(&plan.events, &scheduler_config.zone);
    if plan.is_complete() {
        println!("all {:.0} min placed", plan.placed_minutes);
    } else {
        println!(
            "shortfall: {:.0} of {:.0} min could not be placed",
            plan.shortfall_minutes, plan.estimated_minutes
        );
    }
    Ok(())
}
