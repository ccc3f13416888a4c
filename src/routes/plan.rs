//! Weekly plan routes

use axum::{
  extract::State,
  http::HeaderMap,
  response::{IntoResponse, Response},
  routing::get,
  Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{authenticate, ApiJson};
use crate::db::AppState;
use crate::error::AppError;
use crate::plan;

#[derive(Debug, Deserialize)]
struct SavePlanRequest {
  #[serde(default)]
  plan_json: Option<Value>,
}

pub struct PlanRoutes;

impl PlanRoutes {
  pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
      .route("/", get(Self::handle_get).post(Self::handle_save))
      .route("/summary", get(Self::handle_summary))
      .with_state(state)
  }

  async fn handle_get(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let stored = plan::get_plan(&state.db, user_id).await?;
    Ok(Json(stored).into_response())
  }

  async fn handle_save(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SavePlanRequest>,
  ) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let saved = plan::save_plan(&state.db, user_id, request.plan_json.as_ref()).await?;
    Ok(Json(saved).into_response())
  }

  async fn handle_summary(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response, AppError> {
    let user_id = authenticate(&headers)?;
    let summary = plan::plan_summary(&state.db, user_id).await?;
    Ok(Json(summary).into_response())
  }
}
