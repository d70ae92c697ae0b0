//! Request/response payload tree.
//!
//! A JSON-shaped tree whose leaves may also hold native date/times and the
//! handful of non-JSON values a handler can put into a response (records,
//! blobs, callables, absent markers).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::datetime::format::to_canonical;

/// Mapping node of a [`Payload`].
pub type Map = BTreeMap<String, Payload>;

/// Flat query or path parameters.
pub type Params = BTreeMap<String, Payload>;

/// Capability of store records to present themselves as plain data.
///
/// The outbound normalizer calls [`PlainData::to_plain`] before recursing,
/// so wrapper types never reach the wire.
pub trait PlainData: fmt::Debug + Send + Sync {
    /// Plain structure of this record. Must not mutate the record.
    fn to_plain(&self) -> Payload;
}

/// A function-typed value. Never serialized.
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn() -> Payload + Send + Sync>);

impl Callable {
    pub fn new(f: impl Fn() -> Payload + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> Payload {
        (self.0)()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// A node of a request or response payload.
#[derive(Debug, Clone)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Native instant with the offset it was written in.
    DateTime(DateTime<FixedOffset>),
    /// Opaque bytes, never recursed into or stringified.
    Blob(Vec<u8>),
    Array(Vec<Payload>),
    Object(Map),
    /// Store record; flattened by the outbound normalizer.
    Record(Arc<dyn PlainData>),
    Callable(Callable),
    /// Absent value. Omitted from mappings on output; `Null` stays.
    Undefined,
}

impl Payload {
    /// Build a mapping from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a store record.
    pub fn record(record: impl PlainData + 'static) -> Self {
        Self::Record(Arc::new(record))
    }

    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Payload]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that JSON serialization omits from mappings.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Undefined | Self::Callable(_))
    }

    /// Short type name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Blob(_) => "blob",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Record(_) => "record",
            Self::Callable(_) => "callable",
            Self::Undefined => "undefined",
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b && a.offset() == b.offset(),
            (Self::Blob(a), Self::Blob(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            (Self::Callable(a), Self::Callable(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for Payload {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Payload {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<usize> for Payload {
    fn from(value: usize) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for Payload {
    /// Non-finite values have no JSON form and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<DateTime<FixedOffset>> for Payload {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Payload {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<Map> for Payload {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

impl From<Callable> for Payload {
    fn from(value: Callable) -> Self {
        Self::Callable(value)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    /// `None` is an absent value, not `null`.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

/// Serialization is the last line of defence: date/times are written in
/// canonical form and omitted values follow JSON rules even when a payload
/// skipped the outbound normalizer.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Undefined | Self::Callable(_) => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.serialize_str(&to_canonical(dt)),
            Self::Blob(bytes) => serializer.serialize_bytes(bytes),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(None)?;
                for (key, value) in map.iter().filter(|(_, v)| !v.is_omitted()) {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Self::Record(record) => record.to_plain().serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug)]
    struct Ticket;

    impl PlainData for Ticket {
        fn to_plain(&self) -> Payload {
            Payload::object([("seat", Payload::from("12A"))])
        }
    }

    #[test]
    fn test_from_json_value_keeps_shape() {
        let payload = Payload::from(json!({"a": [1, "x", null], "b": {"c": true}}));
        let map = payload.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(payload.get("a").unwrap().as_array().unwrap().len(), 3);
        assert_eq!(payload.get("b").unwrap().get("c").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_option_none_is_undefined() {
        assert_eq!(Payload::from(None::<String>), Payload::Undefined);
        assert_eq!(Payload::from(Some("x")), Payload::from("x"));
    }

    #[test]
    fn test_serialize_omits_undefined_keeps_null() {
        let payload = Payload::object([
            ("gone", Payload::Undefined),
            ("fn", Payload::Callable(Callable::new(|| Payload::Null))),
            ("kept", Payload::Null),
        ]);
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"kept": null}));
    }

    #[test]
    fn test_serialize_datetime_is_canonical() {
        let dt = Utc.with_ymd_and_hms(2025, 10, 25, 10, 0, 0).unwrap();
        let payload = Payload::from(vec![Payload::from(dt)]);
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"["2025-10-25T10:00:00.000Z"]"#
        );
    }

    #[test]
    fn test_serialize_record_uses_plain_data() {
        let payload = Payload::object([("ticket", Payload::record(Ticket))]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"ticket": {"seat": "12A"}})
        );
    }

    #[test]
    fn test_datetime_equality_includes_offset() {
        let utc = Utc.with_ymd_and_hms(2025, 10, 25, 10, 0, 0).unwrap();
        let shifted = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_ne!(Payload::from(utc), Payload::from(shifted));
        assert_eq!(Payload::from(utc), Payload::from(utc.fixed_offset()));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert!(Payload::from(f64::NAN).is_null());
    }
}
