//! JSON REST API for Folio.
//!
//! Exposes an axum [`Router`] backed by any [`folio_core::store::KvStore`].
//! CORS, auth, TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/make-server", folio_api::api_router(store.clone(), "portfolio-backend"))
//! ```

pub mod contacts;
pub mod error;
pub mod meta;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use folio_core::{ContactService, store::KvStore};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<K> {
  pub contacts:     ContactService<K>,
  /// Reported by `GET /health`.
  pub service_name: Arc<str>,
}

impl<K> Clone for ApiState<K> {
  fn clone(&self) -> Self {
    Self {
      contacts:     self.contacts.clone(),
      service_name: Arc::clone(&self.service_name),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<K>(store: Arc<K>, service_name: impl Into<Arc<str>>) -> Router<()>
where
  K: KvStore + 'static,
{
  let state = ApiState {
    contacts:     ContactService::new(store),
    service_name: service_name.into(),
  };

  Router::new()
    .route("/", get(meta::describe))
    .route("/health", get(meta::health::<K>))
    // Submissions
    .route("/contact", post(contacts::create::<K>))
    .route("/contacts", get(contacts::list::<K>))
    .route("/contact/{id}/status", put(contacts::update_status::<K>))
    .with_state(state)
}
