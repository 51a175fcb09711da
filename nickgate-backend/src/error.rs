use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      error: error.into(),
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  DatabaseError(nickgate_db::DbError),
  ValidationError(String),
  Unauthorized,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::DatabaseError(db_err) => {
        if db_err.is_integrity() {
          // Row-count invariant violations are bugs, not I/O noise
          tracing::error!(%db_err, "remark table integrity violation");
        } else {
          tracing::error!(?db_err, "database error occurred");
        }

        // Don't expose internal database errors
        let error_response = ErrorResponse::new("An internal error occurred. Please try again later.");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
      }
      AppError::ValidationError(msg) => {
        tracing::warn!(validation_error = %msg, "Validation failed");
        let error_response = ErrorResponse::new(msg);
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
      AppError::Unauthorized => {
        let error_response = ErrorResponse::new("Invalid or missing API key");
        (StatusCode::UNAUTHORIZED, Json(error_response)).into_response()
      }
    }
  }
}

impl From<nickgate_db::DbError> for AppError {
  fn from(err: nickgate_db::DbError) -> Self {
    AppError::DatabaseError(err)
  }
}

impl From<crate::validation::ValidationError> for AppError {
  fn from(err: crate::validation::ValidationError) -> Self {
    AppError::ValidationError(err.to_string())
  }
}
