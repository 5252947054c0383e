//! [`SqliteKv`] — the SQLite implementation of [`KvStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use serde_json::Value;

use folio_core::store::KvStore;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A key-value store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteKv {
  conn: tokio_rusqlite::Connection,
}

impl SqliteKv {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn decode(key: String, raw: &str) -> Result<Value> {
  serde_json::from_str(raw).map_err(|source| Error::Json { key, source })
}

// ─── KvStore impl ────────────────────────────────────────────────────────────

impl KvStore for SqliteKv {
  type Error = Error;

  async fn get<'a>(&'a self, key: &'a str) -> Result<Option<Value>> {
    let key_owned = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            rusqlite::params![key_owned],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.map(|r| decode(key.to_owned(), &r)).transpose()
  }

  async fn set<'a>(&'a self, key: &'a str, value: Value) -> Result<()> {
    let key_owned = key.to_owned();
    let value_str = value.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key_owned, value_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::trace!(key, "kv set");
    Ok(())
  }

  async fn get_by_prefix<'a>(&'a self, prefix: &'a str) -> Result<Vec<Value>> {
    let prefix_owned = prefix.to_owned();

    // Compare the leading characters exactly; LIKE would treat `_` and `%` in
    // the prefix as wildcards.
    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT key, value FROM kv_store
           WHERE substr(key, 1, length(?1)) = ?1
           ORDER BY key",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![prefix_owned], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(key, raw)| decode(key, &raw))
      .collect()
  }
}
