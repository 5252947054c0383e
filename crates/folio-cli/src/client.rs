//! Async HTTP client wrapping the folio JSON API.

use anyhow::{Context, Result, anyhow};
use folio_core::submission::ContactSubmission;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Connection settings for the folio API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Base URL including the route prefix, e.g. `http://localhost:8787/make-server`.
  pub base_url: String,
  /// Shared bearer token; empty means none is sent.
  pub token:    String,
}

/// Body of `POST /contact`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactForm {
  pub name:    String,
  pub email:   String,
  pub subject: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub urgency: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Created {
  contact_id: String,
}

#[derive(Deserialize)]
struct Listing {
  contacts: Vec<ContactSubmission>,
}

#[derive(Deserialize)]
struct Updated {
  contact: ContactSubmission,
}

/// Async HTTP client for the folio JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// URL of `/contact/{id}/status` with `id` percent-encoded as one segment.
  fn status_url(&self, id: &str) -> Result<Url> {
    let mut url = Url::parse(&self.config.base_url)
      .with_context(|| format!("invalid base URL {:?}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("base URL {:?} cannot take a path", self.config.base_url))?
      .pop_if_empty()
      .extend(["contact", id, "status"]);
    Ok(url)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.token.is_empty() {
      req
    } else {
      req.bearer_auth(&self.config.token)
    }
  }

  /// `POST /contact` — returns the new contact id.
  pub async fn submit(&self, form: &ContactForm) -> Result<String> {
    let resp = self
      .auth(self.client.post(self.url("/contact")))
      .json(form)
      .send()
      .await
      .context("POST /contact failed")?;

    let created: Created = ensure_success(resp, "POST /contact")
      .await?
      .json()
      .await
      .context("deserialising created contact")?;
    Ok(created.contact_id)
  }

  /// `GET /contacts`
  pub async fn list_contacts(&self) -> Result<Vec<ContactSubmission>> {
    let resp = self
      .auth(self.client.get(self.url("/contacts")))
      .send()
      .await
      .context("GET /contacts failed")?;

    let listing: Listing = ensure_success(resp, "GET /contacts")
      .await?
      .json()
      .await
      .context("deserialising contacts")?;
    Ok(listing.contacts)
  }

  /// `PUT /contact/{id}/status`
  pub async fn update_status(&self, id: &str, status: &str) -> Result<ContactSubmission> {
    let what = format!("PUT /contact/{id}/status");
    let resp = self
      .auth(self.client.put(self.status_url(id)?))
      .json(&serde_json::json!({ "status": status }))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    let updated: Updated = ensure_success(resp, &what)
      .await?
      .json()
      .await
      .context("deserialising updated contact")?;
    Ok(updated.contact)
  }

  /// `GET /health`
  pub async fn health(&self) -> Result<Value> {
    let resp = self
      .auth(self.client.get(self.url("/health")))
      .send()
      .await
      .context("GET /health failed")?;

    ensure_success(resp, "GET /health")
      .await?
      .json()
      .await
      .context("deserialising health")
  }
}

/// Pass successful responses through; turn failures into an error carrying
/// the status and the server's `error` text.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body: Value = resp.json().await.unwrap_or(Value::Null);
  Err(anyhow!(failure_message(what, status, &body)))
}

fn failure_message(what: &str, status: reqwest::StatusCode, body: &Value) -> String {
  format!("{what} → {status}: {}", error_text(body))
}

fn error_text(body: &Value) -> String {
  match (body["error"].as_str(), body["details"].as_str()) {
    (Some(e), Some(d)) => format!("{e} ({d})"),
    (Some(e), None) => e.to_owned(),
    _ => "no error message".to_owned(),
  }
}
