//! Storage port for the one-rep-max pipeline
//!
//! Stats endpoints receive their observations through this trait so the
//! pipeline can be driven from SQLite in production and from fixed data in
//! tests.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::one_rep_max::Observation;

#[async_trait]
pub trait ObservationSource: Send + Sync {
  /// Every logged set for one (user, exercise), oldest first
  async fn observations(&self, user_id: i64, exercise_id: i64) -> AppResult<Vec<Observation>>;
}

#[async_trait]
impl ObservationSource for SqlitePool {
  async fn observations(&self, user_id: i64, exercise_id: i64) -> AppResult<Vec<Observation>> {
    let rows = sqlx::query_as::<_, Observation>(
      r#"
      SELECT w.date, ws.weight, ws.reps
      FROM workout_sets ws
      JOIN workouts w ON ws.workout_id = w.id
      WHERE ws.user_id = ?1 AND ws.exercise_id = ?2
      ORDER BY w.date ASC, ws.set_number ASC
      "#,
    )
    .bind(user_id)
    .bind(exercise_id)
    .fetch_all(self)
    .await?;

    Ok(rows)
  }
}
