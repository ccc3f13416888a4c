//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seed helpers for exercises, workouts and sets
//! - Date helpers
//! - Router request helper
//! - Helper assertions

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tower::ServiceExt;

use crate::routes::USER_ID_HEADER;

/// Rows inserted by the default exercise library migration
pub const DEFAULT_EXERCISE_COUNT: i64 = 36;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Insert an exercise and return its id
pub async fn seed_test_exercise(pool: &SqlitePool, name: &str, muscle_group: &str) -> i64 {
  sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?1, ?2)")
    .bind(name)
    .bind(muscle_group)
    .execute(pool)
    .await
    .expect("Failed to insert test exercise")
    .last_insert_rowid()
}

/// Insert a workout for `user_id` on `date` and return its id
pub async fn seed_test_workout(pool: &SqlitePool, user_id: i64, date: &str) -> i64 {
  sqlx::query("INSERT INTO workouts (user_id, date) VALUES (?1, ?2)")
    .bind(user_id)
    .bind(date)
    .execute(pool)
    .await
    .expect("Failed to insert test workout")
    .last_insert_rowid()
}

/// Insert a logged set and return its id
pub async fn seed_test_set(
  pool: &SqlitePool,
  user_id: i64,
  workout_id: i64,
  exercise_id: i64,
  weight: f64,
  reps: i64,
  set_number: i64,
) -> i64 {
  sqlx::query(
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
  .await
  .expect("Failed to insert test set")
  .last_insert_rowid()
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// `YYYY-MM-DD` for the UTC date N days ago
pub fn date_days_ago(days: i64) -> String {
  (Utc::now() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

/// ---------------------------------------------------------------------------
/// Router Helpers
/// ---------------------------------------------------------------------------

/// Send one request through a router and decode the JSON response body.
/// Empty or non-JSON bodies decode to `Value::Null`.
pub async fn send_json(
  app: Router,
  method: Method,
  uri: &str,
  user_id: Option<i64>,
  body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(id) = user_id {
    builder = builder.header(USER_ID_HEADER, id.to_string());
  }
  let request = match body {
    Some(json) => builder
      .header("content-type", "application/json")
      .body(Body::from(json.to_string())),
    None => builder.body(Body::empty()),
  }
  .expect("Failed to build request");

  let response = app.oneshot(request).await.expect("Router failed");
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("Failed to read response body");

  (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercises', 'workouts', 'workout_sets', 'plans')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    let exercises: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
      .fetch_one(&pool)
      .await
      .expect("Failed to count exercises");
    assert_eq!(exercises, DEFAULT_EXERCISE_COUNT);

    let (group, category): (String, String) =
      sqlx::query_as("SELECT muscle_group, category FROM exercises WHERE name = 'Pull-ups'")
        .fetch_one(&pool)
        .await
        .expect("Default library is missing Pull-ups");
    assert_eq!(group, "Back");
    assert_eq!(category, "bodyweight");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_helpers_link_rows() {
    let pool = setup_test_db().await;

    let exercise_id = seed_test_exercise(&pool, "Trap bar deadlift", "Back").await;
    let workout_id = seed_test_workout(&pool, 1, "2024-01-01").await;
    seed_test_set(&pool, 1, workout_id, exercise_id, 180.0, 3, 1).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_sets WHERE workout_id = ?1")
      .bind(workout_id)
      .fetch_one(&pool)
      .await
      .expect("Failed to count sets");

    assert_eq!(count, 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_date_days_ago_format() {
    let date = date_days_ago(7);
    assert_eq!(date.len(), 10);
    assert!(date < date_days_ago(0));
  }
}
