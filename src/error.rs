use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{0}")]
  BadRequest(String),

  #[error("Authentication required")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("{0}")]
  Internal(String),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Unique-constraint violations surface as conflicts, anything else as a
  /// database error
  pub fn from_insert(e: sqlx::Error, conflict_message: &str) -> Self {
    if let sqlx::Error::Database(db) = &e {
      if db.is_unique_violation() {
        return Self::Conflict(conflict_message.to_string());
      }
    }
    Self::Database(e)
  }
}

// Extractor failures answer with the same JSON body as handler errors
impl From<JsonRejection> for AppError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for AppError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for AppError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error: String,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      // Driver details stay in the log
      Self::Database(e) => {
        tracing::error!(error = %e, "Database request failed");
        "Database request failed".to_string()
      }
      Self::Internal(msg) => {
        tracing::error!(error = %msg, "Internal error");
        msg.clone()
      }
      other => other.to_string(),
    };

    (status, Json(ErrorBody { error: message })).into_response()
  }
}

pub type AppResult<T> = Result<T, AppError>;
