//! Contact submissions — the single record type the service persists.
//!
//! A submission is written once at creation and rewritten in full whenever
//! its status changes. Timestamps are kept as the strings the caller (or the
//! service) produced, so a record reads back exactly as it was written.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Every submission key starts with this prefix; listing scans it.
pub const SUBMISSION_PREFIX: &str = "contact_";

/// Status assigned to every freshly created submission.
pub const INITIAL_STATUS: &str = "new";

const MISSING_FIELDS: &str = "Missing required fields";

// ─── Urgency ─────────────────────────────────────────────────────────────────

/// Caller-supplied priority hint. The service stores it and does nothing else
/// with it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
  Low,
  #[default]
  Medium,
  High,
}

impl Urgency {
  pub fn as_str(self) -> &'static str {
    match self {
      Urgency::Low => "low",
      Urgency::Medium => "medium",
      Urgency::High => "high",
    }
  }
}

impl fmt::Display for Urgency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Urgency {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "low" => Ok(Urgency::Low),
      "medium" => Ok(Urgency::Medium),
      "high" => Ok(Urgency::High),
      other => Err(Error::Validation(format!(
        "invalid urgency {other:?}: expected low, medium or high"
      ))),
    }
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A persisted contact-form submission, as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
  /// `contact_<epoch-millis>_<suffix>`; also the store key.
  pub id:         String,
  pub name:       String,
  pub email:      String,
  #[serde(default)]
  pub phone:      String,
  #[serde(default)]
  pub company:    String,
  pub subject:    String,
  pub message:    String,
  #[serde(default)]
  pub urgency:    Urgency,
  /// ISO-8601 submission time, caller-supplied or server-assigned.
  pub timestamp:  String,
  /// Free-form; starts as [`INITIAL_STATUS`].
  pub status:     String,
  /// Set by the most recent status update, absent before the first one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>,
}

impl ContactSubmission {
  /// The parsed submission time, or `None` if the stored string is not a
  /// form [`parse_timestamp`] understands.
  pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
    parse_timestamp(&self.timestamp)
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Raw input for [`ContactService::create`](crate::ContactService::create).
///
/// Every field is optional here; [`NewSubmission::into_submission`] enforces
/// which ones must be present and fills in defaults for the rest.
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
  pub name:      Option<String>,
  pub email:     Option<String>,
  pub phone:     Option<String>,
  pub company:   Option<String>,
  pub subject:   Option<String>,
  pub message:   Option<String>,
  pub urgency:   Option<String>,
  pub timestamp: Option<String>,
}

impl NewSubmission {
  /// Validate the input and build the record to be stored under `id`.
  ///
  /// `name`, `email`, `subject` and `message` must be present and non-empty.
  /// Empty optional fields are treated as absent. A supplied `timestamp` is
  /// stored exactly as given, whether or not it parses.
  pub fn into_submission(
    self,
    id: String,
    now: DateTime<Utc>,
  ) -> Result<ContactSubmission> {
    let (Some(name), Some(email), Some(subject), Some(message)) = (
      non_empty(self.name),
      non_empty(self.email),
      non_empty(self.subject),
      non_empty(self.message),
    ) else {
      return Err(Error::Validation(MISSING_FIELDS.to_owned()));
    };

    let urgency = non_empty(self.urgency)
      .map(|u| u.parse::<Urgency>())
      .transpose()?
      .unwrap_or_default();

    let timestamp =
      non_empty(self.timestamp).unwrap_or_else(|| format_timestamp(now));

    Ok(ContactSubmission {
      id,
      name,
      email,
      phone: non_empty(self.phone).unwrap_or_default(),
      company: non_empty(self.company).unwrap_or_default(),
      subject,
      message,
      urgency,
      timestamp,
      status: INITIAL_STATUS.to_owned(),
      updated_at: None,
    })
  }
}

fn non_empty(field: Option<String>) -> Option<String> {
  field.filter(|s| !s.is_empty())
}

// ─── Ids and timestamps ──────────────────────────────────────────────────────

const SUFFIX_LEN: usize = 9;
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh submission id: `contact_<epoch-millis>_<suffix>`.
///
/// The suffix is nine base-36 characters drawn from the OS RNG, roughly 46
/// bits on top of the millisecond timestamp.
pub fn generate_id(now: DateTime<Utc>) -> String {
  let mut bits = OsRng.next_u64();
  let suffix: String = (0..SUFFIX_LEN)
    .map(|_| {
      let c = SUFFIX_ALPHABET[(bits % 36) as usize] as char;
      bits /= 36;
      c
    })
    .collect();
  format!("{SUBMISSION_PREFIX}{}_{suffix}", now.timestamp_millis())
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp: RFC 3339, or a date-time or bare date without
/// an offset, both read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
  }

  fn minimal() -> NewSubmission {
    NewSubmission {
      name: Some("Ada".into()),
      email: Some("ada@x.com".into()),
      subject: Some("Hi".into()),
      message: Some("Hello".into()),
      ..Default::default()
    }
  }

  #[test]
  fn minimal_input_gets_defaults() {
    let sub = minimal()
      .into_submission("contact_1_abc".into(), now())
      .unwrap();
    assert_eq!(sub.phone, "");
    assert_eq!(sub.company, "");
    assert_eq!(sub.urgency, Urgency::Medium);
    assert_eq!(sub.status, "new");
    assert_eq!(sub.timestamp, "2024-05-01T09:30:00.000Z");
    assert!(sub.updated_at.is_none());
  }

  #[test]
  fn empty_required_field_is_rejected() {
    let input = NewSubmission { email: Some(String::new()), ..minimal() };
    let err = input.into_submission("x".into(), now()).unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m == MISSING_FIELDS));
  }

  #[test]
  fn empty_urgency_defaults_to_medium() {
    let input = NewSubmission { urgency: Some(String::new()), ..minimal() };
    let sub = input.into_submission("x".into(), now()).unwrap();
    assert_eq!(sub.urgency, Urgency::Medium);
  }

  #[test]
  fn unknown_urgency_is_rejected() {
    let input = NewSubmission { urgency: Some("urgent".into()), ..minimal() };
    assert!(matches!(
      input.into_submission("x".into(), now()),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn supplied_timestamp_is_kept_verbatim() {
    let ts = "2023-12-24T18:00:00+02:00";
    let input = NewSubmission { timestamp: Some(ts.into()), ..minimal() };
    let sub = input.into_submission("x".into(), now()).unwrap();
    assert_eq!(sub.timestamp, ts);
  }

  #[test]
  fn any_supplied_timestamp_is_accepted() {
    for ts in ["2024-01-01", "2024-01-01T10:00:00", "yesterday"] {
      let input = NewSubmission { timestamp: Some(ts.into()), ..minimal() };
      let sub = input.into_submission("x".into(), now()).unwrap();
      assert_eq!(sub.timestamp, ts);
    }
  }

  #[test]
  fn offsetless_iso_forms_parse_as_utc() {
    let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2024-01-01"), Some(midnight));
    assert_eq!(
      parse_timestamp("2024-01-01T10:00:00.000"),
      Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
    );
    assert_eq!(parse_timestamp("yesterday"), None);
  }

  #[test]
  fn generated_id_has_expected_shape() {
    let id = generate_id(now());
    let rest = id.strip_prefix(SUBMISSION_PREFIX).unwrap();
    let (millis, suffix) = rest.split_once('_').unwrap();
    assert_eq!(millis, now().timestamp_millis().to_string());
    assert_eq!(suffix.len(), SUFFIX_LEN);
    assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
  }

  #[test]
  fn record_serialises_with_camel_case_and_omits_unset_updated_at() {
    let sub = minimal().into_submission("x".into(), now()).unwrap();
    let json = serde_json::to_value(&sub).unwrap();
    assert_eq!(json["urgency"], "medium");
    assert!(json.get("updatedAt").is_none());

    let updated = ContactSubmission {
      updated_at: Some(format_timestamp(now())),
      ..sub
    };
    let json = serde_json::to_value(&updated).unwrap();
    assert_eq!(json["updatedAt"], "2024-05-01T09:30:00.000Z");
  }
}
