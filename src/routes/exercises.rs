//! Exercise library routes
//!
//! The library is shared, so these handlers do not read a user id.

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::get,
  Json, Router,
};
use std::sync::Arc;

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse};
use crate::db::AppState;
use crate::error::AppError;
use crate::exercises::{self, ExerciseFilter};
use crate::models::NewExercise;

pub struct ExerciseRoutes;

impl ExerciseRoutes {
  pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
      .route("/", get(Self::handle_list).post(Self::handle_create))
      .route("/muscle-groups/list", get(Self::handle_muscle_groups))
      .route(
        "/:id",
        get(Self::handle_get).put(Self::handle_update).delete(Self::handle_delete),
      )
      .with_state(state)
  }

  async fn handle_list(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<ExerciseFilter>,
  ) -> Result<Response, AppError> {
    let list = exercises::list_exercises(&state.db, &filter).await?;
    Ok(Json(list).into_response())
  }

  async fn handle_get(State(state): State<Arc<AppState>>, ApiPath(id): ApiPath<i64>) -> Result<Response, AppError> {
    let exercise = exercises::get_exercise(&state.db, id).await?;
    Ok(Json(exercise).into_response())
  }

  async fn handle_create(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<NewExercise>,
  ) -> Result<Response, AppError> {
    let exercise = exercises::create_exercise(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(exercise)).into_response())
  }

  async fn handle_update(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<NewExercise>,
  ) -> Result<Response, AppError> {
    let exercise = exercises::update_exercise(&state.db, id, &request).await?;
    Ok(Json(exercise).into_response())
  }

  async fn handle_delete(State(state): State<Arc<AppState>>, ApiPath(id): ApiPath<i64>) -> Result<Response, AppError> {
    exercises::delete_exercise(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Exercise deleted successfully")).into_response())
  }

  async fn handle_muscle_groups(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let groups = exercises::muscle_groups(&state.db).await?;
    Ok(Json(groups).into_response())
  }
}
