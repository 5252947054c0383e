//! The `KvStore` trait: the collaborator contract the service is written
//! against.
//!
//! Backends (e.g. `folio-store-sqlite`) implement it. Keys are plain strings
//! and values are arbitrary JSON; the service owns the record shape.

use std::future::Future;

use serde_json::Value;

/// Abstraction over a durable string-to-JSON key-value store.
///
/// Only point reads, point writes and a prefix scan are required. There is no
/// conditional write, so callers that read-modify-write are not atomic.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait KvStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the value stored under `key`. Returns `None` if absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return every value whose key starts with `prefix`. Order is unspecified.
  fn get_by_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send + 'a;
}
