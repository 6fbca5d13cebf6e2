//! Schedule inputs: the daily routine and the assignments placed into it.

pub mod assignment;
pub mod routine;

pub use assignment::{Assignment, AssignmentInput, AssignmentKind};
pub use routine::{parse_hhmm, Routine, RoutineInput};
