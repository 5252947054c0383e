//! Health check and API description.

use axum::{Json, extract::State};
use chrono::Utc;
use folio_core::{store::KvStore, submission::format_timestamp};
use serde::Serialize;

use crate::ApiState;

const ENDPOINTS: [&str; 4] = [
  "POST /contact - Submit contact form",
  "GET /contacts - Retrieve all contacts",
  "PUT /contact/:id/status - Update contact status",
  "GET /health - Health check",
];

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:    &'static str,
  pub timestamp: String,
  pub service:   String,
}

/// `GET /health` — never touches the store.
pub async fn health<K>(State(state): State<ApiState<K>>) -> Json<Health>
where
  K: KvStore + 'static,
{
  Json(Health {
    status:    "healthy",
    timestamp: format_timestamp(Utc::now()),
    service:   state.service_name.to_string(),
  })
}

#[derive(Debug, Serialize)]
pub struct Description {
  pub message:   &'static str,
  pub version:   &'static str,
  pub endpoints: [&'static str; 4],
}

/// `GET /`
pub async fn describe() -> Json<Description> {
  Json(Description {
    message:   "Portfolio contact API",
    version:   env!("CARGO_PKG_VERSION"),
    endpoints: ENDPOINTS,
  })
}
