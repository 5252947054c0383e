//! HTTP server wiring for Folio.
//!
//! Mounts [`folio_api::api_router`] under the configured route prefix and adds
//! the transport concerns the API crate leaves out: CORS, request tracing and
//! the optional bearer-token gate.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  http::{Method, header},
  middleware,
  routing::get,
};
use folio_core::store::KvStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use auth::{AuthConfig, require_bearer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FOLIO_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Path every API route is mounted under, e.g. `/make-server`.
  pub route_prefix:      String,
  pub store_path:        PathBuf,
  /// Reported by the health check.
  pub service_name:      String,
  /// Hex SHA-256 of the shared bearer token. Unset means the API is open.
  pub auth_token_sha256: Option<String>,
}

impl ServerConfig {
  /// Load from an optional TOML file at `path`, overridden by environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8787)?
      .set_default("route_prefix", "/make-server")?
      .set_default("store_path", "folio.db")?
      .set_default("service_name", "portfolio-backend")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FOLIO"))
      .build()?
      .try_deserialize()
  }

  /// The route prefix with a leading `/` and no trailing `/`; empty for the
  /// root.
  pub fn normalized_prefix(&self) -> String {
    let trimmed = self.route_prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
      String::new()
    } else {
      format!("/{trimmed}")
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
///
/// Fails only if `auth_token_sha256` is set but is not a valid digest.
pub fn app<K>(store: Arc<K>, config: &ServerConfig) -> Result<Router, Error>
where
  K: KvStore + 'static,
{
  let prefix = config.normalized_prefix();
  let api = folio_api::api_router(store, config.service_name.as_str());

  let mut app = if prefix.is_empty() {
    api
  } else {
    // The nested `/` route answers the bare prefix; the description is also
    // served with the trailing slash.
    Router::new()
      .route(&format!("{prefix}/"), get(folio_api::meta::describe))
      .nest(&prefix, api)
  };

  if let Some(digest) = &config.auth_token_sha256 {
    let auth = AuthConfig::from_hex(digest, vec![format!("{prefix}/health")])?;
    app = app.layer(middleware::from_fn_with_state(Arc::new(auth), require_bearer));
  }

  Ok(app.layer(TraceLayer::new_for_http()).layer(cors_layer()))
}

/// Any origin may call the API; the browser form posts JSON cross-origin.
fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use folio_store_sqlite::SqliteKv;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn config(token: Option<&str>) -> ServerConfig {
    ServerConfig {
      host:              "127.0.0.1".to_string(),
      port:              8787,
      route_prefix:      "/make-server/".to_string(),
      store_path:        PathBuf::from(":memory:"),
      service_name:      "portfolio-backend".to_string(),
      auth_token_sha256: token.map(auth::hash_token),
    }
  }

  async fn make_app(token: Option<&str>) -> Router {
    let store = SqliteKv::open_in_memory().await.unwrap();
    app(Arc::new(store), &config(token)).unwrap()
  }

  async fn oneshot_raw(
    app:     Router,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn contact_body() -> String {
    json!({
      "name": "Ada", "email": "ada@x.com", "subject": "Hi", "message": "Hello"
    })
    .to_string()
  }

  // ── Prefix ──────────────────────────────────────────────────────────────────

  #[test]
  fn prefix_is_normalized() {
    let mut cfg = config(None);
    assert_eq!(cfg.normalized_prefix(), "/make-server");
    cfg.route_prefix = "functions/v1".into();
    assert_eq!(cfg.normalized_prefix(), "/functions/v1");
    cfg.route_prefix = "/".into();
    assert_eq!(cfg.normalized_prefix(), "");
  }

  #[tokio::test]
  async fn routes_are_mounted_under_prefix() {
    let app = make_app(None).await;
    let resp = oneshot_raw(
      app.clone(),
      "POST",
      "/make-server/contact",
      vec![(header::CONTENT_TYPE, "application/json")],
      &contact_body(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_raw(app.clone(), "GET", "/make-server/contacts", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["total"], 1);

    let resp = oneshot_raw(app, "GET", "/contacts", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn description_is_served_with_and_without_trailing_slash() {
    let app = make_app(None).await;
    for uri in ["/make-server", "/make-server/"] {
      let resp = oneshot_raw(app.clone(), "GET", uri, vec![], "").await;
      assert_eq!(resp.status(), StatusCode::OK, "{uri}");
      assert_eq!(body_json(resp).await["endpoints"].as_array().unwrap().len(), 4);
    }
  }

  #[tokio::test]
  async fn root_prefix_mounts_at_root() {
    let store = SqliteKv::open_in_memory().await.unwrap();
    let cfg = ServerConfig { route_prefix: "/".into(), ..config(None) };
    let app = app(Arc::new(store), &cfg).unwrap();
    let resp = oneshot_raw(app, "GET", "/health", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── CORS ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn preflight_allows_any_origin() {
    let app = make_app(Some("s3cret")).await;
    let resp = oneshot_raw(
      app,
      "OPTIONS",
      "/make-server/contact",
      vec![
        (header::ORIGIN, "https://portfolio.example"),
        (header::ACCESS_CONTROL_REQUEST_METHOD, "POST"),
        (header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,authorization"),
      ],
      "",
    )
    .await;
    assert!(resp.status().is_success(), "status: {}", resp.status());
    let origin = resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap();
    assert_eq!(origin, "*");
    let methods = resp
      .headers()
      .get(header::ACCESS_CONTROL_ALLOW_METHODS)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(methods.contains("PUT"), "allow-methods: {methods}");
  }

  #[tokio::test]
  async fn simple_requests_carry_cors_header() {
    let app = make_app(None).await;
    let resp = oneshot_raw(
      app,
      "GET",
      "/make-server/health",
      vec![(header::ORIGIN, "https://portfolio.example")],
      "",
    )
    .await;
    assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn open_api_without_token_config() {
    let app = make_app(None).await;
    let resp = oneshot_raw(app, "GET", "/make-server/contacts", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn missing_token_returns_401() {
    let app = make_app(Some("s3cret")).await;
    let resp = oneshot_raw(app, "GET", "/make-server/contacts", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(body_json(resp).await["error"], "Unauthorized");
  }

  #[tokio::test]
  async fn valid_token_is_accepted() {
    let app = make_app(Some("s3cret")).await;
    let resp = oneshot_raw(
      app,
      "POST",
      "/make-server/contact",
      vec![
        (header::AUTHORIZATION, "Bearer s3cret"),
        (header::CONTENT_TYPE, "application/json"),
      ],
      &contact_body(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["success"], true);
  }

  #[tokio::test]
  async fn health_is_open_when_token_configured() {
    let app = make_app(Some("s3cret")).await;
    let resp = oneshot_raw(app, "GET", "/make-server/health", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["service"], "portfolio-backend");
  }

  #[tokio::test]
  async fn invalid_digest_is_a_startup_error() {
    let store = SqliteKv::open_in_memory().await.unwrap();
    let cfg = ServerConfig {
      auth_token_sha256: Some("zz".into()),
      ..config(None)
    };
    assert!(matches!(
      app(Arc::new(store), &cfg),
      Err(Error::InvalidTokenDigest(_))
    ));
  }

  // ── Config ──────────────────────────────────────────────────────────────────

  #[test]
  fn load_applies_defaults_and_file_values() {
    let path = std::env::temp_dir().join(format!(
      "folio-config-test-{}.toml",
      std::process::id()
    ));
    std::fs::write(&path, "port = 9000\nservice_name = \"folio-test\"\n").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.service_name, "folio-test");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.route_prefix, "/make-server");
    assert!(cfg.auth_token_sha256.is_none());
  }
}
