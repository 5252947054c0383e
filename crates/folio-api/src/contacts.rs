//! Handlers for the contact submission endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contact` | Body: [`ContactBody`]; returns the new `contactId` |
//! | `GET`  | `/contacts` | All submissions, newest first |
//! | `PUT`  | `/contact/{id}/status` | Body: `{"status":"..."}`; 404 if unknown |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use folio_core::{
  store::KvStore,
  submission::{ContactSubmission, NewSubmission},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contact`.
///
/// Every field is optional at the wire level so that a missing field surfaces
/// as a validation error rather than a deserialisation failure.
#[derive(Debug, Default, Deserialize)]
pub struct ContactBody {
  pub name:      Option<String>,
  pub email:     Option<String>,
  pub phone:     Option<String>,
  pub company:   Option<String>,
  pub subject:   Option<String>,
  pub message:   Option<String>,
  pub urgency:   Option<String>,
  pub timestamp: Option<String>,
}

impl From<ContactBody> for NewSubmission {
  fn from(b: ContactBody) -> Self {
    NewSubmission {
      name:      b.name,
      email:     b.email,
      phone:     b.phone,
      company:   b.company,
      subject:   b.subject,
      message:   b.message,
      urgency:   b.urgency,
      timestamp: b.timestamp,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
  pub success:    bool,
  pub message:    &'static str,
  pub contact_id: String,
}

/// `POST /contact`
pub async fn create<K>(
  State(state): State<ApiState<K>>,
  body: Result<Json<ContactBody>, JsonRejection>,
) -> Result<Json<CreatedResponse>, ApiError>
where
  K: KvStore + 'static,
{
  let Json(body) = body?;
  let contact = state
    .contacts
    .create(NewSubmission::from(body))
    .await
    .map_err(|e| {
      ApiError::from_core(e, "Failed to process contact form submission")
    })?;

  Ok(Json(CreatedResponse {
    success:    true,
    message:    "Contact form submitted successfully",
    contact_id: contact.id,
  }))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub success:  bool,
  pub contacts: Vec<ContactSubmission>,
  pub total:    usize,
}

/// `GET /contacts`
pub async fn list<K>(
  State(state): State<ApiState<K>>,
) -> Result<Json<ListResponse>, ApiError>
where
  K: KvStore + 'static,
{
  let contacts = state.contacts.list().await.map_err(|e| {
    ApiError::from_core(e, "Failed to retrieve contact submissions")
  })?;

  Ok(Json(ListResponse {
    success: true,
    total: contacts.len(),
    contacts,
  }))
}

// ─── Update status ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub success: bool,
  pub message: &'static str,
  pub contact: ContactSubmission,
}

/// `PUT /contact/{id}/status` — body: `{"status":"..."}`
pub async fn update_status<K>(
  State(state): State<ApiState<K>>,
  Path(id): Path<String>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError>
where
  K: KvStore + 'static,
{
  let Json(body) = body?;
  let status = body
    .status
    .ok_or_else(|| ApiError::BadRequest("Missing status".to_owned()))?;

  let contact = state
    .contacts
    .update_status(&id, status)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to update contact status"))?;

  Ok(Json(StatusResponse {
    success: true,
    message: "Contact status updated",
    contact,
  }))
}
