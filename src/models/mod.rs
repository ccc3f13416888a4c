pub mod exercise;
pub mod plan;
pub mod workout;

pub use exercise::{Exercise, NewExercise};
pub use plan::{PlanEntry, PlanSession, WeeklyPlan};
pub use workout::{NewSet, NewWorkout, Workout, WorkoutSet, WorkoutWithSets};
