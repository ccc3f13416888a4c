//! Liveness endpoint

use axum::{routing::get, Json, Router};

pub struct HealthRoutes;

impl HealthRoutes {
  pub fn routes() -> Router {
    async fn health_handler() -> Json<serde_json::Value> {
      Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
      }))
    }

    Router::new().route("/health", get(health_handler))
  }
}
