//! Workout sessions and the sets logged in them

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{NewSet, NewWorkout, Workout, WorkoutSet, WorkoutWithSets};
use crate::one_rep_max::day_key;

const WORKOUT_NOT_FOUND: &str = "Workout not found";

const SET_COLUMNS: &str = r#"
  SELECT ws.id, ws.user_id, ws.workout_id, ws.exercise_id, ws.weight, ws.reps,
         ws.set_number, ws.created_at, e.name AS exercise_name, e.muscle_group
  FROM workout_sets ws
  JOIN exercises e ON ws.exercise_id = e.id
"#;

/// Normalize a submitted date to `YYYY-MM-DD`, rejecting anything unparseable
fn normalize_date(date: &str) -> AppResult<String> {
  if date.trim().is_empty() {
    return Err(AppError::BadRequest("Workout date is required".into()));
  }
  let day = day_key(date.trim());
  NaiveDate::parse_from_str(day, "%Y-%m-%d")
    .map(|d| d.format("%Y-%m-%d").to_string())
    .map_err(|_| AppError::BadRequest(format!("Invalid workout date: {}", date)))
}

async fn sets_for_workout(pool: &SqlitePool, workout_id: i64) -> AppResult<Vec<WorkoutSet>> {
  let sql = format!("{SET_COLUMNS} WHERE ws.workout_id = ?1 ORDER BY ws.set_number ASC");
  let sets = sqlx::query_as::<_, WorkoutSet>(&sql)
    .bind(workout_id)
    .fetch_all(pool)
    .await?;
  Ok(sets)
}

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

/// Every workout for the user, newest first, each with its sets
pub async fn list_workouts(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<WorkoutWithSets>> {
  let workouts = sqlx::query_as::<_, Workout>(
    "SELECT id, user_id, date, notes, created_at FROM workouts WHERE user_id = ?1 ORDER BY date DESC, id DESC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let mut result = Vec::with_capacity(workouts.len());
  for workout in workouts {
    let sets = sets_for_workout(pool, workout.id).await?;
    result.push(WorkoutWithSets { workout, sets });
  }
  Ok(result)
}

pub async fn get_workout(pool: &SqlitePool, user_id: i64, workout_id: i64) -> AppResult<WorkoutWithSets> {
  let workout = sqlx::query_as::<_, Workout>(
    "SELECT id, user_id, date, notes, created_at FROM workouts WHERE id = ?1 AND user_id = ?2",
  )
  .bind(workout_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.into()))?;

  let sets = sets_for_workout(pool, workout.id).await?;
  Ok(WorkoutWithSets { workout, sets })
}

pub async fn create_workout(pool: &SqlitePool, user_id: i64, new: &NewWorkout) -> AppResult<Workout> {
  let date = normalize_date(&new.date)?;

  let workout = sqlx::query_as::<_, Workout>(
    r#"
    INSERT INTO workouts (user_id, date, notes)
    VALUES (?1, ?2, ?3)
    RETURNING id, user_id, date, notes, created_at
    "#,
  )
  .bind(user_id)
  .bind(&date)
  .bind(&new.notes)
  .fetch_one(pool)
  .await?;

  tracing::info!(user_id, workout_id = workout.id, %date, "Created workout");
  Ok(workout)
}

pub async fn update_workout(
  pool: &SqlitePool,
  user_id: i64,
  workout_id: i64,
  update: &NewWorkout,
) -> AppResult<Workout> {
  let date = normalize_date(&update.date)?;

  sqlx::query_as::<_, Workout>(
    r#"
    UPDATE workouts SET date = ?1, notes = ?2
    WHERE id = ?3 AND user_id = ?4
    RETURNING id, user_id, date, notes, created_at
    "#,
  )
  .bind(&date)
  .bind(&update.notes)
  .bind(workout_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.into()))
}

/// Delete a workout; its sets go with it
pub async fn delete_workout(pool: &SqlitePool, user_id: i64, workout_id: i64) -> AppResult<()> {
  let result = sqlx::query("DELETE FROM workouts WHERE id = ?1 AND user_id = ?2")
    .bind(workout_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(WORKOUT_NOT_FOUND.into()));
  }
  tracing::info!(user_id, workout_id, "Deleted workout");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Sets
/// ---------------------------------------------------------------------------

/// Required fields of a set request. Missing and zero are both rejected.
fn validate_set(set: &NewSet) -> AppResult<(i64, f64, i64, i64)> {
  match (set.exercise_id, set.weight, set.reps, set.set_number) {
    (Some(exercise_id), Some(weight), Some(reps), Some(set_number))
      if exercise_id != 0 && weight != 0.0 && reps != 0 && set_number != 0 =>
    {
      if weight < 0.0 || reps < 0 || set_number < 0 {
        return Err(AppError::BadRequest("Weight, reps and set number must be positive".into()));
      }
      Ok((exercise_id, weight, reps, set_number))
    }
    _ => Err(AppError::BadRequest(
      "exercise_id, weight, reps and set_number are required".into(),
    )),
  }
}

/// Log a set against one of the user's workouts
pub async fn add_set(pool: &SqlitePool, user_id: i64, workout_id: i64, set: &NewSet) -> AppResult<WorkoutSet> {
  let (exercise_id, weight, reps, set_number) = validate_set(set)?;

  let owned: Option<i64> = sqlx::query_scalar("SELECT id FROM workouts WHERE id = ?1 AND user_id = ?2")
    .bind(workout_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
  if owned.is_none() {
    return Err(AppError::NotFound(WORKOUT_NOT_FOUND.into()));
  }

  let exercise: Option<i64> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ?1")
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?;
  if exercise.is_none() {
    return Err(AppError::NotFound("Exercise not found".into()));
  }

  let set_id = sqlx::query(
    r#"
    INSERT INTO workout_sets (user_id, workout_id, exercise_id, weight, reps, set_number)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(user_id)
  .bind(workout_id)
  .bind(exercise_id)
  .bind(weight)
  .bind(reps)
  .bind(set_number)
  .execute(pool)
  .await?
  .last_insert_rowid();

  tracing::debug!(user_id, workout_id, set_id, exercise_id, weight, reps, "Logged set");

  let sql = format!("{SET_COLUMNS} WHERE ws.id = ?1");
  let created = sqlx::query_as::<_, WorkoutSet>(&sql)
    .bind(set_id)
    .fetch_one(pool)
    .await?;
  Ok(created)
}

pub async fn delete_set(pool: &SqlitePool, user_id: i64, set_id: i64) -> AppResult<()> {
  let result = sqlx::query("DELETE FROM workout_sets WHERE id = ?1 AND user_id = ?2")
    .bind(set_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Set not found".into()));
  }
  Ok(())
}
