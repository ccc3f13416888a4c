//! HTTP surface
//!
//! Each resource contributes a `Router` nested under `/api`. Identity is
//! established upstream; handlers read the numeric user id it forwards.

pub mod exercises;
pub mod health;
pub mod plan;
pub mod stats;
pub mod workouts;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::HeaderMap;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::AppState;
use crate::error::{AppError, AppResult};

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Body for endpoints that only confirm an action
#[derive(Debug, Serialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// `Json` body whose rejections become `AppError::BadRequest`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` string whose rejections become `AppError::BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `Path` parameters whose rejections become `AppError::BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// User id from the forwarded identity header
pub fn authenticate(headers: &HeaderMap) -> AppResult<i64> {
  headers
    .get(USER_ID_HEADER)
    .and_then(|h| h.to_str().ok())
    .and_then(|v| v.trim().parse::<i64>().ok())
    .filter(|id| *id > 0)
    .ok_or(AppError::Unauthorized)
}

/// Full application router
pub fn app(state: Arc<AppState>) -> Router {
  Router::new()
    .merge(health::HealthRoutes::routes())
    .nest("/api/exercises", exercises::ExerciseRoutes::routes(state.clone()))
    .nest("/api/workouts", workouts::WorkoutRoutes::routes(state.clone()))
    .nest("/api/plan", plan::PlanRoutes::routes(state.clone()))
    .nest("/api/stats", stats::StatsRoutes::routes(state))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{send_json, setup_test_db, teardown_test_db, DEFAULT_EXERCISE_COUNT};
  use axum::http::{HeaderValue, Method, StatusCode};

  #[test]
  fn test_authenticate_reads_user_header() {
    let mut headers = HeaderMap::new();
    assert!(matches!(authenticate(&headers), Err(AppError::Unauthorized)));

    headers.insert(USER_ID_HEADER, HeaderValue::from_static("abc"));
    assert!(matches!(authenticate(&headers), Err(AppError::Unauthorized)));

    headers.insert(USER_ID_HEADER, HeaderValue::from_static("0"));
    assert!(matches!(authenticate(&headers), Err(AppError::Unauthorized)));

    headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 42 "));
    assert_eq!(authenticate(&headers).unwrap(), 42);
  }

  #[tokio::test]
  async fn test_app_mounts_resources_under_api() {
    let pool = setup_test_db().await;
    let router = app(Arc::new(AppState { db: pool.clone() }));

    let (status, _) = send_json(router.clone(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(router.clone(), Method::GET, "/api/exercises", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len() as i64, DEFAULT_EXERCISE_COUNT);

    let (status, _) = send_json(router.clone(), Method::GET, "/api/stats/recent-summary", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(router, Method::GET, "/api/stats/recent-summary", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));

    teardown_test_db(pool).await;
  }
}
