use clap::Subcommand;
use schedulize_core::{Config, Routine, RoutineInput};

#[derive(Subcommand)]
pub enum RoutineAction {
    /// Show the stored routine
    Show,
    /// Replace the routine
    Set {
        /// Wake time (HH:MM)
        #[arg(long)]
        wake: String,
        /// Sleep time (HH:MM); may be after midnight
        #[arg(long)]
        sleep: String,
        /// Meal start time (HH:MM), repeatable
        #[arg(long = "meal")]
        meals: Vec<String>,
    },
    /// Remove the routine
    Clear,
}

pub fn run(action: RoutineAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RoutineAction::Show => {
            let config = Config::load()?;
            let routine = config.routine()?;
            println!("{}", serde_json::to_string_pretty(&routine.to_input())?);
        }
        RoutineAction::Set { wake, sleep, meals } => {
            let input = RoutineInput {
                wake_time: Some(wake),
                sleep_time: Some(sleep),
                meal_times: meals,
            };
            let routine = Routine::try_from(&input)?;

            let mut config = Config::load()?;
            config.routine = Some(routine.to_input());
            config.save()?;
            println!("routine updated");
        }
        RoutineAction::Clear => {
            let mut config = Config::load()?;
            config.routine = None;
            config.save()?;
            println!("routine cleared");
        }
    }
    Ok(())
}
