//! Statistics routes
//!
//! Every handler accepts an optional `formula` (`epley` or `brzycki`) where a
//! one-rep-max is involved; each endpoint keeps its own default.

use axum::{
  extract::State,
  http::HeaderMap,
  response::{IntoResponse, Response},
  routing::get,
  Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{authenticate, ApiQuery};
use crate::db::AppState;
use crate::error::{AppError, AppResult};
use crate::one_rep_max::OneRepMaxFormula;
use crate::stats;

const DEFAULT_ONE_REP_MAX_LIMIT: i64 = 10;
const DEFAULT_RECENT_SETS_LIMIT: i64 = 10;
const DEFAULT_RECENT_WORKOUTS_LIMIT: i64 = 5;
const DEFAULT_FREQUENCY_DAYS: i64 = 30;
const DEFAULT_PROGRESS_DAYS: i64 = 90;

/// Union of the query parameters used across stats endpoints.
///
/// Values are kept as raw strings so an empty parameter (`?exercise_id=`)
/// reads as absent and a malformed number becomes a JSON error.
#[derive(Debug, Default, Deserialize)]
struct StatsQuery {
  exercise_id: Option<String>,
  limit: Option<String>,
  days: Option<String>,
  start_date: Option<String>,
  end_date: Option<String>,
  formula: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integer(name: &str, value: &Option<String>) -> AppResult<Option<i64>> {
  present(value)
    .map(|raw| {
      raw
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("{} must be an integer", name)))
    })
    .transpose()
}

impl StatsQuery {
  fn exercise_id(&self) -> AppResult<Option<i64>> {
    parse_integer("exercise_id", &self.exercise_id)
  }

  fn require_exercise(&self) -> AppResult<i64> {
    self
      .exercise_id()?
      .ok_or_else(|| AppError::BadRequest("exercise_id is required".into()))
  }

  fn limit_or(&self, default: i64) -> AppResult<i64> {
    Ok(parse_integer("limit", &self.limit)?.unwrap_or(default))
  }

  fn days_or(&self, default: i64) -> AppResult<i64> {
    Ok(parse_integer("days", &self.days)?.unwrap_or(default))
  }

  fn start_date(&self) -> Option<&str> {
    present(&self.start_date)
  }

  fn end_date(&self) -> Option<&str> {
    present(&self.end_date)
  }

  fn formula_or(&self, default: OneRepMaxFormula) -> AppResult<OneRepMaxFormula> {
    match present(&self.formula) {
      None => Ok(default),
      Some(name) => name.parse().map_err(AppError::BadRequest),
    }
  }
}

pub struct StatsRoutes;

impl StatsRoutes {
  pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
      .route("/one-rep-max", get(Self::handle_one_rep_max))
      .route("/weekly-volume", get(Self::handle_weekly_volume))
      .route("/personal-records", get(Self::handle_personal_records))
      .route("/workout-frequency", get(Self::handle_workout_frequency))
      .route("/exercise-progress", get(Self::handle_exercise_progress))
      .route("/muscle-group-distribution", get(Self::handle_muscle_group_distribution))
      .route("/recent-summary", get(Self::handle_recent_summary))
      .route("/performance/sets", get(Self::handle_performance_sets))
      .route("/performance", get(Self::handle_performance))
      .route("/weekly-sets-by-muscle-group", get(Self::handle_weekly_sets))
      .route("/recent-sets", get(Self::handle_recent_sets))
      .route("/suggested-weights", get(Self::handle_suggested_weights))
      .with_state(state)
  }

  async fn handle_one_rep_max(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let formula = query.formula_or(OneRepMaxFormula::Epley)?;
    let limit = query.limit_or(DEFAULT_ONE_REP_MAX_LIMIT)?;

    let result = stats::one_rep_max_stats(&state.db, user_id, query.exercise_id()?, limit, formula).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_weekly_volume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let result = stats::weekly_volume(
      &state.db,
      user_id,
      query.start_date(),
      query.end_date(),
    )
    .await?;
    Ok(Json(result).into_response())
  }

  async fn handle_personal_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let formula = query.formula_or(OneRepMaxFormula::Epley)?;

    let result = stats::personal_records(&state.db, user_id, query.exercise_id()?, formula).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_workout_frequency(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let days = query.days_or(DEFAULT_FREQUENCY_DAYS)?;

    let result = stats::workout_frequency(&state.db, user_id, days).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_exercise_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let exercise_id = query.require_exercise()?;
    let formula = query.formula_or(OneRepMaxFormula::Epley)?;
    let days = query.days_or(DEFAULT_PROGRESS_DAYS)?;

    let result = stats::exercise_progress(&state.db, user_id, exercise_id, days, formula).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_muscle_group_distribution(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let days = query.days_or(DEFAULT_FREQUENCY_DAYS)?;

    let result = stats::muscle_group_distribution(&state.db, user_id, days).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_recent_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let limit = query.limit_or(DEFAULT_RECENT_WORKOUTS_LIMIT)?;

    let result = stats::recent_summary(&state.db, user_id, limit).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_performance_sets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let exercise_id = query.require_exercise()?;

    let result = stats::performance_sets(&state.db, user_id, exercise_id).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_performance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let exercise_id = query.require_exercise()?;
    let formula = query.formula_or(OneRepMaxFormula::Brzycki)?;

    let result = stats::performance_chart(&state.db, user_id, exercise_id, formula).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_weekly_sets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let result = stats::weekly_sets_by_muscle_group(
      &state.db,
      user_id,
      query.start_date(),
      query.end_date(),
    )
    .await?;
    Ok(Json(result).into_response())
  }

  async fn handle_recent_sets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let exercise_id = query.require_exercise()?;
    let formula = query.formula_or(OneRepMaxFormula::Brzycki)?;
    let limit = query.limit_or(DEFAULT_RECENT_SETS_LIMIT)?;

    let result = stats::recent_sets(&state.db, user_id, exercise_id, limit, formula).await?;
    Ok(Json(result).into_response())
  }

  async fn handle_suggested_weights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let exercise_id = query.require_exercise()?;
    let formula = query.formula_or(OneRepMaxFormula::Brzycki)?;

    let result = stats::suggested_weights(&state.db, user_id, exercise_id, formula).await?;
    Ok(Json(result).into_response())
  }
}
