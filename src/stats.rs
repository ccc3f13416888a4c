//! Training statistics for one user
//!
//! Aggregates that SQLite does well (counts, sums, averages) stay in SQL.
//! Anything involving a one-rep-max goes through `one_rep_max` so every
//! endpoint shares one implementation of the formulas.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashSet};

use crate::error::AppResult;
use crate::one_rep_max::{
  self, day_key, OneRepMaxFormula, OneRepMaxPoint, OneRepMaxSummary,
};
use crate::store::ObservationSource;

/// ---------------------------------------------------------------------------
/// Result Types
/// ---------------------------------------------------------------------------

/// Best estimated 1RM set for an exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseOneRepMax {
  pub exercise_id: i64,
  pub exercise_name: String,
  pub muscle_group: String,
  pub weight: f64,
  pub reps: i64,
  pub one_rep_max: f64,
  pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MuscleGroupVolume {
  pub muscle_group: String,
  pub total_volume: f64,
  pub workout_count: i64,
  pub total_sets: i64,
  pub avg_weight: f64,
  pub avg_reps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
  pub exercise_id: i64,
  pub exercise_name: String,
  pub muscle_group: String,
  pub max_weight: f64,
  pub max_reps: i64,
  pub max_volume: f64,
  pub max_one_rep_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutFrequency {
  pub date: String,
  pub workout_count: i64,
}

/// Per-day progress for a single exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseProgress {
  pub date: String,
  pub avg_weight: f64,
  pub avg_reps: f64,
  pub max_weight: f64,
  pub max_one_rep_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MuscleGroupDistribution {
  pub muscle_group: String,
  pub total_sets: i64,
  pub total_volume: f64,
  pub workout_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentWorkout {
  pub id: i64,
  pub date: String,
  pub notes: Option<String>,
  pub total_sets: i64,
  pub total_volume: f64,
  pub exercises_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PerformanceSet {
  pub date: String,
  pub weight: f64,
  pub reps: i64,
  pub set_number: i64,
}

/// Chart data: best 1RM per day plus the smoothed trend over it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceChart {
  pub formula: OneRepMaxFormula,
  pub daily_max: Vec<OneRepMaxPoint>,
  /// `[epoch_millis, one_rm]` pairs; empty below three days of data
  pub trend: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMuscleSets {
  pub muscle_group: String,
  /// ISO week label, e.g. `2024-W07`
  pub week: String,
  pub total_sets: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSet {
  /// `DD Mon YY`
  pub date_formatted: String,
  pub weight: f64,
  pub reps: i64,
  pub set_number: i64,
  pub one_rep_max: f64,
}

/// ---------------------------------------------------------------------------
/// Shared Row Fetching
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
struct ExerciseSetRow {
  exercise_id: i64,
  exercise_name: String,
  muscle_group: String,
  weight: f64,
  reps: i64,
  date: String,
}

async fn fetch_exercise_sets(
  pool: &SqlitePool,
  user_id: i64,
  exercise_id: Option<i64>,
) -> AppResult<Vec<ExerciseSetRow>> {
  let rows = sqlx::query_as::<_, ExerciseSetRow>(
    r#"
    SELECT
      e.id AS exercise_id,
      e.name AS exercise_name,
      e.muscle_group,
      ws.weight,
      ws.reps,
      w.date
    FROM workout_sets ws
    JOIN exercises e ON ws.exercise_id = e.id
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?1 AND (?2 IS NULL OR e.id = ?2)
    ORDER BY w.date ASC, ws.set_number ASC
    "#,
  )
  .bind(user_id)
  .bind(exercise_id)
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// `WHERE` fragment for optional date bounds, appended after the user filter
fn date_bounds(start_date: Option<&str>, end_date: Option<&str>) -> (&'static str, Vec<String>) {
  match (start_date, end_date) {
    (Some(start), Some(end)) => (" AND w.date BETWEEN ? AND ?", vec![start.to_string(), end.to_string()]),
    (Some(start), None) => (" AND w.date >= ?", vec![start.to_string()]),
    _ => ("", Vec::new()),
  }
}

/// sqlite modifier for "N days back from today"
fn days_back(days: i64) -> String {
  format!("-{} days", days.max(0))
}

/// ---------------------------------------------------------------------------
/// One-Rep-Max Statistics
/// ---------------------------------------------------------------------------

/// Best 1RM per exercise among the user's top `limit` sets, best first
pub async fn one_rep_max_stats(
  pool: &SqlitePool,
  user_id: i64,
  exercise_id: Option<i64>,
  limit: i64,
  formula: OneRepMaxFormula,
) -> AppResult<Vec<ExerciseOneRepMax>> {
  let mut candidates: Vec<ExerciseOneRepMax> = fetch_exercise_sets(pool, user_id, exercise_id)
    .await?
    .into_iter()
    .map(|row| ExerciseOneRepMax {
      one_rep_max: formula.estimate(row.weight, row.reps),
      exercise_id: row.exercise_id,
      exercise_name: row.exercise_name,
      muscle_group: row.muscle_group,
      weight: row.weight,
      reps: row.reps,
      date: row.date,
    })
    .collect();

  candidates.sort_by(|a, b| b.one_rep_max.total_cmp(&a.one_rep_max));
  candidates.truncate(limit.max(0) as usize);

  // Sorted descending, so the first row seen per exercise is its best
  let mut seen = HashSet::new();
  candidates.retain(|c| seen.insert(c.exercise_id));

  Ok(candidates)
}

/// Lifetime bests per exercise, ordered by estimated 1RM
pub async fn personal_records(
  pool: &SqlitePool,
  user_id: i64,
  exercise_id: Option<i64>,
  formula: OneRepMaxFormula,
) -> AppResult<Vec<PersonalRecord>> {
  let rows = fetch_exercise_sets(pool, user_id, exercise_id).await?;

  let mut by_exercise: BTreeMap<i64, PersonalRecord> = BTreeMap::new();
  for row in rows {
    let one_rm = formula.estimate(row.weight, row.reps);
    let volume = row.weight * row.reps as f64;

    let record = by_exercise.entry(row.exercise_id).or_insert_with(|| PersonalRecord {
      exercise_id: row.exercise_id,
      exercise_name: row.exercise_name.clone(),
      muscle_group: row.muscle_group.clone(),
      max_weight: row.weight,
      max_reps: row.reps,
      max_volume: volume,
      max_one_rep_max: one_rm,
    });
    record.max_weight = record.max_weight.max(row.weight);
    record.max_reps = record.max_reps.max(row.reps);
    record.max_volume = record.max_volume.max(volume);
    record.max_one_rep_max = record.max_one_rep_max.max(one_rm);
  }

  let mut records: Vec<PersonalRecord> = by_exercise.into_values().collect();
  records.sort_by(|a, b| b.max_one_rep_max.total_cmp(&a.max_one_rep_max));
  Ok(records)
}

/// Day-by-day progress for one exercise over the last `days` days, newest first
pub async fn exercise_progress(
  pool: &SqlitePool,
  user_id: i64,
  exercise_id: i64,
  days: i64,
  formula: OneRepMaxFormula,
) -> AppResult<Vec<ExerciseProgress>> {
  let rows: Vec<(String, f64, i64)> = sqlx::query_as(
    r#"
    SELECT w.date, ws.weight, ws.reps
    FROM workout_sets ws
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?1 AND ws.exercise_id = ?2
      AND w.date >= date('now', ?3)
    ORDER BY w.date ASC, ws.set_number ASC
    "#,
  )
  .bind(user_id)
  .bind(exercise_id)
  .bind(days_back(days))
  .fetch_all(pool)
  .await?;

  #[derive(Default)]
  struct DayTotals {
    sets: usize,
    weight_sum: f64,
    reps_sum: f64,
    max_weight: f64,
    max_one_rep_max: f64,
  }

  let mut by_day: BTreeMap<String, DayTotals> = BTreeMap::new();
  for (date, weight, reps) in rows {
    let totals = by_day.entry(day_key(&date).to_string()).or_default();
    totals.sets += 1;
    totals.weight_sum += weight;
    totals.reps_sum += reps as f64;
    totals.max_weight = totals.max_weight.max(weight);
    totals.max_one_rep_max = totals.max_one_rep_max.max(formula.estimate(weight, reps));
  }

  Ok(
    by_day
      .into_iter()
      .rev()
      .map(|(date, t)| ExerciseProgress {
        date,
        avg_weight: t.weight_sum / t.sets as f64,
        avg_reps: t.reps_sum / t.sets as f64,
        max_weight: t.max_weight,
        max_one_rep_max: t.max_one_rep_max,
      })
      .collect(),
  )
}

/// Best 1RM per day and its smoothed trend, for chart overlays
pub async fn performance_chart(
  source: &dyn ObservationSource,
  user_id: i64,
  exercise_id: i64,
  formula: OneRepMaxFormula,
) -> AppResult<PerformanceChart> {
  let observations = source.observations(user_id, exercise_id).await?;
  let daily_max = one_rep_max::daily_max_series(&one_rep_max::estimated_points(&observations, formula));
  let trend = one_rep_max::trend_line(&daily_max);

  Ok(PerformanceChart {
    formula,
    daily_max,
    trend,
  })
}

/// Current estimated 1RM and the loads to aim for next session
pub async fn suggested_weights(
  source: &dyn ObservationSource,
  user_id: i64,
  exercise_id: i64,
  formula: OneRepMaxFormula,
) -> AppResult<OneRepMaxSummary> {
  let observations = source.observations(user_id, exercise_id).await?;
  if observations.is_empty() {
    tracing::debug!(user_id, exercise_id, "No sets logged, returning empty suggestions");
  }
  Ok(one_rep_max::summarize(&observations, formula))
}

/// Most recent sets for an exercise with their estimated 1RM
pub async fn recent_sets(
  pool: &SqlitePool,
  user_id: i64,
  exercise_id: i64,
  limit: i64,
  formula: OneRepMaxFormula,
) -> AppResult<Vec<RecentSet>> {
  let rows: Vec<(String, f64, i64, i64)> = sqlx::query_as(
    r#"
    SELECT w.date, ws.weight, ws.reps, ws.set_number
    FROM workout_sets ws
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?1 AND ws.exercise_id = ?2
    ORDER BY w.date DESC, ws.set_number ASC
    LIMIT ?3
    "#,
  )
  .bind(user_id)
  .bind(exercise_id)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok(
    rows
      .into_iter()
      .map(|(date, weight, reps, set_number)| RecentSet {
        date_formatted: format_short_date(&date),
        weight,
        reps,
        set_number,
        one_rep_max: formula.estimate(weight, reps),
      })
      .collect(),
  )
}

/// `2024-01-05` -> `05 Jan 24`; unparseable dates pass through unchanged
fn format_short_date(date: &str) -> String {
  NaiveDate::parse_from_str(day_key(date), "%Y-%m-%d")
    .map(|d| d.format("%d %b %y").to_string())
    .unwrap_or_else(|_| date.to_string())
}

/// ---------------------------------------------------------------------------
/// Volume and Frequency
/// ---------------------------------------------------------------------------

/// Totals per muscle group inside an optional date range, largest volume first
pub async fn weekly_volume(
  pool: &SqlitePool,
  user_id: i64,
  start_date: Option<&str>,
  end_date: Option<&str>,
) -> AppResult<Vec<MuscleGroupVolume>> {
  let (bounds, params) = date_bounds(start_date, end_date);
  let sql = format!(
    r#"
    SELECT
      e.muscle_group,
      CAST(SUM(ws.weight * ws.reps) AS REAL) AS total_volume,
      COUNT(DISTINCT w.id) AS workout_count,
      COUNT(ws.id) AS total_sets,
      CAST(AVG(ws.weight) AS REAL) AS avg_weight,
      CAST(AVG(ws.reps) AS REAL) AS avg_reps
    FROM workout_sets ws
    JOIN exercises e ON ws.exercise_id = e.id
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?{bounds}
    GROUP BY e.muscle_group
    ORDER BY total_volume DESC
    "#
  );

  let mut query = sqlx::query_as::<_, MuscleGroupVolume>(&sql).bind(user_id);
  for param in &params {
    query = query.bind(param.as_str());
  }

  Ok(query.fetch_all(pool).await?)
}

/// Number of workouts per date over the last `days` days, newest first
pub async fn workout_frequency(pool: &SqlitePool, user_id: i64, days: i64) -> AppResult<Vec<WorkoutFrequency>> {
  let rows = sqlx::query_as::<_, WorkoutFrequency>(
    r#"
    SELECT date, COUNT(*) AS workout_count
    FROM workouts
    WHERE user_id = ?1 AND date >= date('now', ?2)
    GROUP BY date
    ORDER BY date DESC
    "#,
  )
  .bind(user_id)
  .bind(days_back(days))
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// Sets, volume and sessions per muscle group over the last `days` days
pub async fn muscle_group_distribution(
  pool: &SqlitePool,
  user_id: i64,
  days: i64,
) -> AppResult<Vec<MuscleGroupDistribution>> {
  let rows = sqlx::query_as::<_, MuscleGroupDistribution>(
    r#"
    SELECT
      e.muscle_group,
      COUNT(ws.id) AS total_sets,
      CAST(SUM(ws.weight * ws.reps) AS REAL) AS total_volume,
      COUNT(DISTINCT w.id) AS workout_count
    FROM workout_sets ws
    JOIN exercises e ON ws.exercise_id = e.id
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?1 AND w.date >= date('now', ?2)
    GROUP BY e.muscle_group
    ORDER BY total_volume DESC
    "#,
  )
  .bind(user_id)
  .bind(days_back(days))
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// Latest workouts with set count, volume and distinct exercises
pub async fn recent_summary(pool: &SqlitePool, user_id: i64, limit: i64) -> AppResult<Vec<RecentWorkout>> {
  let rows = sqlx::query_as::<_, RecentWorkout>(
    r#"
    SELECT
      w.id,
      w.date,
      w.notes,
      COUNT(ws.id) AS total_sets,
      CAST(COALESCE(SUM(ws.weight * ws.reps), 0) AS REAL) AS total_volume,
      COUNT(DISTINCT ws.exercise_id) AS exercises_count
    FROM workouts w
    LEFT JOIN workout_sets ws ON w.id = ws.workout_id
    WHERE w.user_id = ?1
    GROUP BY w.id
    ORDER BY w.date DESC
    LIMIT ?2
    "#,
  )
  .bind(user_id)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// Every set for an exercise, oldest first
pub async fn performance_sets(pool: &SqlitePool, user_id: i64, exercise_id: i64) -> AppResult<Vec<PerformanceSet>> {
  let rows = sqlx::query_as::<_, PerformanceSet>(
    r#"
    SELECT w.date, ws.weight, ws.reps, ws.set_number
    FROM workout_sets ws
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?1 AND ws.exercise_id = ?2
    ORDER BY w.date ASC, ws.set_number ASC
    "#,
  )
  .bind(user_id)
  .bind(exercise_id)
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// Set counts per muscle group per ISO week, ordered by group then week
pub async fn weekly_sets_by_muscle_group(
  pool: &SqlitePool,
  user_id: i64,
  start_date: Option<&str>,
  end_date: Option<&str>,
) -> AppResult<Vec<WeeklyMuscleSets>> {
  let (bounds, params) = date_bounds(start_date, end_date);
  let sql = format!(
    r#"
    SELECT e.muscle_group, w.date
    FROM workout_sets ws
    JOIN exercises e ON ws.exercise_id = e.id
    JOIN workouts w ON ws.workout_id = w.id
    WHERE ws.user_id = ?{bounds}
    "#
  );

  let mut query = sqlx::query_as::<_, (String, String)>(&sql).bind(user_id);
  for param in &params {
    query = query.bind(param.as_str());
  }
  let rows = query.fetch_all(pool).await?;

  let mut counts: BTreeMap<(String, String), i64> = BTreeMap::new();
  for (muscle_group, date) in rows {
    match iso_week_label(&date) {
      Some(week) => *counts.entry((muscle_group, week)).or_insert(0) += 1,
      None => tracing::warn!(%date, "Skipping set with unparseable workout date"),
    }
  }

  Ok(
    counts
      .into_iter()
      .map(|((muscle_group, week), total_sets)| WeeklyMuscleSets {
        muscle_group,
        week,
        total_sets,
      })
      .collect(),
  )
}

/// `2024-02-14` -> `2024-W07`, using the ISO week-numbering year
fn iso_week_label(date: &str) -> Option<String> {
  let week = NaiveDate::parse_from_str(day_key(date), "%Y-%m-%d").ok()?.iso_week();
  Some(format!("{}-W{:02}", week.year(), week.week()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
