use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workout {
  pub id: i64,
  pub user_id: i64,
  /// Calendar date, `YYYY-MM-DD`
  pub date: String,
  pub notes: Option<String>,
  pub created_at: Option<NaiveDateTime>,
}

/// For inserting or updating workouts (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkout {
  /// Missing dates are rejected when the workout is stored
  #[serde(default)]
  pub date: String,
  #[serde(default)]
  pub notes: Option<String>,
}

/// A logged set joined with its exercise
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutSet {
  pub id: i64,
  pub user_id: i64,
  pub workout_id: i64,
  pub exercise_id: i64,
  pub weight: f64,
  pub reps: i64,
  pub set_number: i64,
  pub created_at: Option<NaiveDateTime>,
  pub exercise_name: String,
  pub muscle_group: String,
}

/// Request body for logging a set; zero counts as missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSet {
  #[serde(default)]
  pub exercise_id: Option<i64>,
  #[serde(default)]
  pub weight: Option<f64>,
  #[serde(default)]
  pub reps: Option<i64>,
  #[serde(default)]
  pub set_number: Option<i64>,
}

/// Workout history entry with its sets attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutWithSets {
  #[serde(flatten)]
  pub workout: Workout,
  pub sets: Vec<WorkoutSet>,
}
