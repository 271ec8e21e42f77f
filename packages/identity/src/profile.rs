//! # Public profile projection
//!
//! Profile rows are read from the database as JSON objects (`to_jsonb(p)`), so the
//! shape that reaches this module is whatever the `profiles` table looks like today,
//! private columns included. [`PublicProfile::from_record`] turns such a record into the
//! fixed public shape:
//!
//! - only columns named in the allow-list are read; everything else is ignored, so a
//!   new column never leaks through an existing endpoint;
//! - `full_name` is accepted as a fallback for `display_name` and `created_at` becomes
//!   `joined_at`;
//! - timestamps (RFC 3339, Postgres text form, or epoch seconds/milliseconds) become
//!   RFC 3339 UTC strings with second precision;
//! - counters accept numbers or numeric strings and default to `0`;
//! - `website` keeps only `http`/`https` URLs;
//! - blank strings and unusable optional values become `None`.
//!
//! `id` and `username` are required.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProfileError;

/// Aggregated participation numbers shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStats {
    pub events_attended: u32,
    pub hackathons_won: u32,
    pub projects_submitted: u32,
}

/// Profile information safe to show to anyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github_username: Option<String>,
    pub joined_at: Option<String>,
    pub stats: PublicStats,
}

impl PublicProfile {
    /// Every key a serialized profile can contain.
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "username",
        "display_name",
        "avatar_url",
        "bio",
        "location",
        "website",
        "github_username",
        "joined_at",
        "stats",
    ];

    /// Every key a serialized [`PublicStats`] can contain.
    pub const STAT_FIELDS: &'static [&'static str] =
        &["events_attended", "hackathons_won", "projects_submitted"];

    /// Project a raw profile row onto the public shape.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, ProfileError> {
        Ok(Self {
            id: required_id(record, "id")?,
            username: required_text(record, "username")?,
            display_name: text(record, "display_name").or_else(|| text(record, "full_name")),
            avatar_url: text(record, "avatar_url"),
            bio: text(record, "bio"),
            location: text(record, "location"),
            website: web_url(record, "website"),
            github_username: text(record, "github_username"),
            joined_at: timestamp(record, "created_at"),
            stats: PublicStats {
                events_attended: count(record, "events_attended"),
                hackathons_won: count(record, "hackathons_won"),
                projects_submitted: count(record, "projects_submitted"),
            },
        })
    }

    /// Name to show, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

fn required_id(record: &Map<String, Value>, field: &'static str) -> Result<String, ProfileError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ProfileError::MissingField(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        Some(other) => Err(ProfileError::InvalidField {
            field,
            reason: format!("expected a string or integer, got {other}"),
        }),
    }
}

fn required_text(record: &Map<String, Value>, field: &'static str) -> Result<String, ProfileError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ProfileError::MissingField(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(other) => Err(ProfileError::InvalidField {
            field,
            reason: format!("expected a non-empty string, got {other}"),
        }),
    }
}

fn text(record: &Map<String, Value>, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => {
            tracing::warn!(field, "Ignoring non-text profile value: {}", other);
            None
        }
    }
}

fn web_url(record: &Map<String, Value>, field: &str) -> Option<String> {
    let url = text(record, field)?;
    let scheme = url
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase());
    if matches!(scheme.as_deref(), Some("http" | "https")) {
        Some(url)
    } else {
        tracing::warn!(field, "Ignoring profile URL without an http(s) scheme");
        None
    }
}

fn count(record: &Map<String, Value>, field: &str) -> u32 {
    let parsed = match record.get(field) {
        None | Some(Value::Null) => return 0,
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match parsed.map(u32::try_from) {
        Some(Ok(n)) => n,
        Some(Err(_)) => u32::MAX,
        None => {
            tracing::warn!(field, "Ignoring unusable profile counter");
            0
        }
    }
}

fn timestamp(record: &Map<String, Value>, field: &str) -> Option<String> {
    let parsed = match record.get(field)? {
        Value::Null => return None,
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(field, "Ignoring unparseable profile timestamp");
    }
    parsed.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Values above this are taken as milliseconds (year 5138 in seconds).
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    // Postgres text output, e.g. "2024-03-01 12:30:00.123456+00"
    if let Ok(t) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
