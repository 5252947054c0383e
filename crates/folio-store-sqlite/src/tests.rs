//! Integration tests for `SqliteKv` against an in-memory database, including
//! the contact service running on top of it.

use std::sync::Arc;

use folio_core::{
  ContactService,
  store::KvStore,
  submission::NewSubmission,
};
use serde_json::json;

use crate::SqliteKv;

async fn store() -> SqliteKv {
  SqliteKv::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Point reads and writes ──────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get("contact_nope").await.unwrap().is_none());
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  let value = json!({ "name": "Ada", "tags": ["a", "b"], "n": 3 });
  s.set("contact_1", value.clone()).await.unwrap();
  assert_eq!(s.get("contact_1").await.unwrap(), Some(value));
}

#[tokio::test]
async fn set_overwrites_existing_value() {
  let s = store().await;
  s.set("k", json!({ "status": "new" })).await.unwrap();
  s.set("k", json!({ "status": "read" })).await.unwrap();
  assert_eq!(s.get("k").await.unwrap(), Some(json!({ "status": "read" })));
  assert_eq!(s.get_by_prefix("k").await.unwrap().len(), 1);
}

// ─── Prefix scan ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_by_prefix_filters_by_leading_characters() {
  let s = store().await;
  s.set("contact_2", json!(2)).await.unwrap();
  s.set("contact_1", json!(1)).await.unwrap();
  s.set("contacts", json!("no underscore")).await.unwrap();
  s.set("other_contact_3", json!(3)).await.unwrap();

  let values = s.get_by_prefix("contact_").await.unwrap();
  assert_eq!(values, vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn get_by_prefix_treats_wildcards_literally() {
  let s = store().await;
  s.set("a%b", json!("percent")).await.unwrap();
  s.set("axb", json!("x")).await.unwrap();

  assert_eq!(s.get_by_prefix("a%").await.unwrap(), vec![json!("percent")]);
}

#[tokio::test]
async fn get_by_prefix_empty_store() {
  let s = store().await;
  assert!(s.get_by_prefix("contact_").await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
  let path = std::env::temp_dir().join(format!(
    "folio-kv-test-{}-{}.db",
    std::process::id(),
    line!()
  ));
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteKv::open(&path).await.unwrap();
    s.set("contact_1", json!({ "name": "Ada" })).await.unwrap();
  }
  let s = SqliteKv::open(&path).await.unwrap();
  assert_eq!(s.get("contact_1").await.unwrap(), Some(json!({ "name": "Ada" })));

  drop(s);
  let _ = std::fs::remove_file(&path);
}

// ─── Service on SQLite ───────────────────────────────────────────────────────

#[tokio::test]
async fn service_lifecycle_on_sqlite() {
  let svc = ContactService::new(Arc::new(store().await));

  let created = svc
    .create(NewSubmission {
      name: Some("Grace".into()),
      email: Some("grace@navy.mil".into()),
      subject: Some("Compilers".into()),
      message: Some("Let's talk.".into()),
      timestamp: Some("2024-06-01T08:00:00.000Z".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  let updated = svc.update_status(&created.id, "archived".into()).await.unwrap();
  assert_eq!(updated.status, "archived");

  let all = svc.list().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0], updated);
}
