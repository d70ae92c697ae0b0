//! Field access over normalized request payloads.
//!
//! Date fields are read after inbound normalization, so a valid ISO-8601
//! value is already a `Payload::DateTime`; a date field still holding a
//! string did not match the format and is rejected here.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::datetime::{to_canonical, Payload};
use crate::error::ApiError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// A non-empty string field.
pub fn opt_str(body: &Payload, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Payload::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An opaque secret. A secret that looks like an ISO-8601 date arrives as a
/// date/time and is read back in canonical form, which is a pure function of
/// the submitted text, so the same input always yields the same secret.
pub fn opt_secret(body: &Payload, key: &str) -> Option<String> {
    match body.get(key)? {
        Payload::String(s) if !s.is_empty() => Some(s.clone()),
        Payload::DateTime(dt) => Some(to_canonical(dt)),
        _ => None,
    }
}

pub fn require_str(body: &Payload, key: &str) -> Result<String, ApiError> {
    opt_str(body, key).ok_or_else(|| ApiError::bad_request(format!("{key} is required")))
}

/// A date field as a UTC instant.
pub fn require_datetime(body: &Payload, key: &str) -> Result<DateTime<Utc>, ApiError> {
    match body.get(key) {
        None | Some(Payload::Null) | Some(Payload::Undefined) => {
            Err(ApiError::bad_request(format!("{key} is required")))
        }
        Some(value) => as_datetime(value, key),
    }
}

/// `Ok(None)` when absent, `Ok(Some(None))` when explicitly `null`.
pub fn opt_nullable_datetime(
    body: &Payload,
    key: &str,
) -> Result<Option<Option<DateTime<Utc>>>, ApiError> {
    match body.get(key) {
        None | Some(Payload::Undefined) => Ok(None),
        Some(Payload::Null) => Ok(Some(None)),
        Some(value) => as_datetime(value, key).map(|dt| Some(Some(dt))),
    }
}

fn as_datetime(value: &Payload, key: &str) -> Result<DateTime<Utc>, ApiError> {
    value
        .as_datetime()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ApiError::bad_request(format!("{key} must be an ISO-8601 date")))
}

/// Parse a document id; anything malformed cannot name a document.
pub fn parse_id(value: Option<&Payload>, not_found: &str) -> Result<Uuid, ApiError> {
    value
        .and_then(Payload::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::not_found(not_found))
}
