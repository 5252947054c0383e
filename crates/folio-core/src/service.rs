//! [`ContactService`] — create, list and update contact submissions on top of
//! any [`KvStore`].

use std::{cmp::Reverse, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
  Error, Result,
  store::KvStore,
  submission::{
    ContactSubmission, NewSubmission, SUBMISSION_PREFIX, format_timestamp,
    generate_id,
  },
};

/// The contact submission lifecycle: created once, listed, status rewritten.
///
/// Holds no state of its own beyond the store handle, so cloning is cheap and
/// every call is independent.
pub struct ContactService<K> {
  store: Arc<K>,
}

impl<K> Clone for ContactService<K> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<K: KvStore> ContactService<K> {
  pub fn new(store: Arc<K>) -> Self { Self { store } }

  /// Validate `input`, persist it under a fresh id and return the stored
  /// record.
  ///
  /// Invalid input fails with [`Error::Validation`] before anything is
  /// written.
  pub async fn create(&self, input: NewSubmission) -> Result<ContactSubmission> {
    let now = Utc::now();
    let submission = input.into_submission(generate_id(now), now)?;

    let value = serde_json::to_value(&submission)?;
    self
      .store
      .set(&submission.id, value)
      .await
      .map_err(Error::store)?;

    tracing::info!(
      contact_id = %submission.id,
      name       = %submission.name,
      email      = %submission.email,
      subject    = %submission.subject,
      urgency    = %submission.urgency,
      timestamp  = %submission.timestamp,
      "new contact form submission"
    );

    Ok(submission)
  }

  /// Every stored submission, newest `timestamp` first.
  ///
  /// The sort is stable, so equal timestamps keep the store's scan order.
  /// Timestamps that do not parse sort after all others.
  pub async fn list(&self) -> Result<Vec<ContactSubmission>> {
    let values = self
      .store
      .get_by_prefix(SUBMISSION_PREFIX)
      .await
      .map_err(Error::store)?;

    let mut contacts = values
      .into_iter()
      .map(serde_json::from_value::<ContactSubmission>)
      .collect::<Result<Vec<_>, _>>()?;

    contacts.sort_by_cached_key(|c| Reverse(c.submitted_at()));
    Ok(contacts)
  }

  /// Replace the status of submission `id` and stamp `updatedAt`.
  ///
  /// The full record is read, patched in memory and written back under the
  /// same key. There is no compare-and-swap: two concurrent updates to the
  /// same id race and the last write wins.
  pub async fn update_status(
    &self,
    id: &str,
    status: String,
  ) -> Result<ContactSubmission> {
    let existing = self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;

    let mut contact: ContactSubmission = serde_json::from_value(existing)?;
    contact.status = status;
    contact.updated_at = Some(format_timestamp(update_time(&contact, Utc::now())));

    let value = serde_json::to_value(&contact)?;
    self.store.set(id, value).await.map_err(Error::store)?;

    tracing::debug!(contact_id = %id, status = %contact.status, "contact status updated");
    Ok(contact)
  }
}

/// `now`, pushed forward so the update is always strictly after the record's
/// own timestamp at the millisecond precision it is written with.
fn update_time(contact: &ContactSubmission, now: DateTime<Utc>) -> DateTime<Utc> {
  match contact.submitted_at() {
    Some(submitted) => now.max(submitted + TimeDelta::milliseconds(1)),
    None => now,
  }
}
