//! Shared bearer-token gate.
//!
//! The server never stores the token itself, only its SHA-256 digest. When a
//! digest is configured every request must present the matching token, except
//! CORS preflights and the health check.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// SHA-256 of the shared token.
  pub token_sha256: [u8; 32],
  /// Paths served without a token.
  pub open_paths:   Vec<String>,
}

impl AuthConfig {
  /// Build from a lowercase or uppercase hex digest, as printed by
  /// `server --hash-token`.
  pub fn from_hex(digest: &str, open_paths: Vec<String>) -> Result<Self, Error> {
    let bytes = hex::decode(digest.trim())
      .map_err(|e| Error::InvalidTokenDigest(e.to_string()))?;
    let token_sha256: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
      Error::InvalidTokenDigest(format!("expected 32 bytes, got {}", b.len()))
    })?;
    Ok(Self { token_sha256, open_paths })
  }
}

/// Hex SHA-256 of `token` with surrounding whitespace removed; the value to
/// put in `auth_token_sha256`.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.trim().as_bytes()))
}

/// Verify the `Authorization: Bearer <token>` header against `config`.
pub fn verify_bearer(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(Error::Unauthorized)?;

  let presented = Sha256::digest(token.trim().as_bytes());

  // Compare every byte so timing does not reveal the matching prefix length.
  let diff = presented
    .iter()
    .zip(config.token_sha256.iter())
    .fold(0u8, |acc, (a, b)| acc | (a ^ b));

  if diff == 0 { Ok(()) } else { Err(Error::Unauthorized) }
}

/// Middleware enforcing [`verify_bearer`] on everything but preflights and
/// the configured open paths.
pub async fn require_bearer(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  let open = req.method() == Method::OPTIONS
    || config.open_paths.iter().any(|p| p == req.uri().path());

  if !open && let Err(e) = verify_bearer(req.headers(), &config) {
    tracing::warn!(path = %req.uri().path(), "rejected request without valid token");
    return e.into_response();
  }
  next.run(req).await
}
