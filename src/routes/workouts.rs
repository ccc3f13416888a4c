//! Workout and set routes, scoped to the requesting user

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
  routing::{delete, get, post},
  Json, Router,
};
use std::sync::Arc;

use super::{authenticate, ApiJson, ApiPath, MessageResponse};
use crate::db::AppState;
use crate::error::AppError;
use crate::models::{NewSet, NewWorkout};
use crate::workouts;

pub struct WorkoutRoutes;

impl WorkoutRoutes {
  pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
      .route("/", get(Self::handle_list).post(Self::handle_create))
      .route(
        "/:id",
        get(Self::handle_get).put(Self::handle_update).delete(Self::handle_delete),
      )
      .route("/:id/sets", post(Self::handle_add_set))
      .route("/sets/:set_id", delete(Self::handle_delete_set))
      .with_state(state)
  }

  async fn handle_list(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let history = workouts::list_workouts(&state.db, user_id).await?;
    Ok(Json(history).into_response())
  }

  async fn handle_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let workout = workouts::get_workout(&state.db, user_id, id).await?;
    Ok(Json(workout).into_response())
  }

  async fn handle_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<NewWorkout>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let workout = workouts::create_workout(&state.db, user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(workout)).into_response())
  }

  async fn handle_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<NewWorkout>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let workout = workouts::update_workout(&state.db, user_id, id, &request).await?;
    Ok(Json(workout).into_response())
  }

  async fn handle_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    workouts::delete_workout(&state.db, user_id, id).await?;
    Ok(Json(MessageResponse::new("Workout deleted successfully")).into_response())
  }

  async fn handle_add_set(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<NewSet>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let set = workouts::add_set(&state.db, user_id, id, &request).await?;
    Ok((StatusCode::CREATED, Json(set)).into_response())
  }

  async fn handle_delete_set(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiPath(set_id): ApiPath<i64>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    workouts::delete_set(&state.db, user_id, set_id).await?;
    Ok(Json(MessageResponse::new("Set deleted successfully")).into_response())
  }
}
