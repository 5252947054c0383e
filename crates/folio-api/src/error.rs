//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// Anything the caller could not have prevented. `message` names the
  /// operation; the source is echoed to the caller as `details`.
  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  folio_core::Error,
  },
}

impl ApiError {
  /// Classify a service error, using `message` if it turns out to be internal.
  pub fn from_core(err: folio_core::Error, message: &'static str) -> Self {
    match err {
      folio_core::Error::Validation(m) => ApiError::BadRequest(m),
      folio_core::Error::NotFound(_) => {
        ApiError::NotFound("Contact not found".to_owned())
      }
      source => ApiError::Internal { message, source },
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": message, "details": source.to_string() })),
        )
          .into_response()
      }
    }
  }
}
