//! Response-side normalization: native date/times become canonical strings.
//!
//! # Responsibilities
//! - Render every date/time as `YYYY-MM-DDTHH:mm:ss.sssZ`
//! - Flatten store records through their plain-data capability
//! - Drop callables and absent values the way JSON serialization does
//!
//! # Design Decisions
//! - Blobs pass through untouched (not stringified, not recursed into)
//! - Inside sequences an omitted value becomes `null` so length is kept
//! - Explicit `null` is always preserved

use crate::datetime::format::to_canonical;
use crate::datetime::{DateTimeNormalizer, Payload};
use crate::observability::metrics;

impl DateTimeNormalizer {
    /// Normalize a response payload for the wire.
    pub fn normalize_outbound(&self, payload: Payload) -> Payload {
        self.outbound_at(payload, 0)
    }

    /// Normalize and serialize in one step.
    pub fn to_json_string(&self, payload: Payload) -> serde_json::Result<String> {
        serde_json::to_string(&self.normalize_outbound(payload))
    }

    /// Normalize and serialize to bytes, as written to a response body.
    pub fn to_json_vec(&self, payload: Payload) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.normalize_outbound(payload))
    }

    fn outbound_at(&self, payload: Payload, depth: usize) -> Payload {
        match payload {
            Payload::DateTime(value) => Payload::String(to_canonical(&value)),
            Payload::Callable(_) => Payload::Undefined,
            Payload::Array(_) | Payload::Object(_) if depth >= self.max_depth => {
                tracing::warn!(
                    depth,
                    max_depth = self.max_depth,
                    kind = payload.kind(),
                    "Outbound payload exceeds depth limit, passing subtree through"
                );
                metrics::record_depth_limit("outbound");
                without_records(payload)
            }
            // A record has no wire form other than its plain projection, and
            // producing that is one more level.
            Payload::Record(_) if depth >= self.max_depth => {
                tracing::warn!(
                    depth,
                    max_depth = self.max_depth,
                    "Outbound record exceeds depth limit, emitting null"
                );
                metrics::record_depth_limit("outbound");
                Payload::Null
            }
            // A record counts as a level so records that expose themselves
            // still terminate.
            Payload::Record(record) => self.outbound_at(record.to_plain(), depth + 1),
            Payload::Array(items) => Payload::Array(
                items
                    .into_iter()
                    .map(|item| match self.outbound_at(item, depth + 1) {
                        omitted if omitted.is_omitted() => Payload::Null,
                        value => value,
                    })
                    .collect(),
            ),
            Payload::Object(map) => Payload::Object(
                map.into_iter()
                    .map(|(key, value)| (key, self.outbound_at(value, depth + 1)))
                    .filter(|(_, value)| !value.is_omitted())
                    .collect(),
            ),
            other => other,
        }
    }
}

/// A subtree passed through at the limit keeps its shape, but records inside
/// it are unbounded (they may expose themselves), so they become `null`.
fn without_records(payload: Payload) -> Payload {
    match payload {
        Payload::Record(_) => Payload::Null,
        Payload::Array(items) => Payload::Array(items.into_iter().map(without_records).collect()),
        Payload::Object(map) => Payload::Object(
            map.into_iter()
                .map(|(key, value)| (key, without_records(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::{parse_date_time, Callable, PlainData};
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::json;

    fn normalizer() -> DateTimeNormalizer {
        DateTimeNormalizer::default()
    }

    #[derive(Debug)]
    struct StoredFlight {
        number: &'static str,
        departs: chrono::DateTime<Utc>,
    }

    impl PlainData for StoredFlight {
        fn to_plain(&self) -> Payload {
            Payload::object([
                ("flightNumber", Payload::from(self.number)),
                ("departs", Payload::from(self.departs)),
                ("gate", Payload::Undefined),
            ])
        }
    }

    #[derive(Debug)]
    struct Mirror;

    impl PlainData for Mirror {
        fn to_plain(&self) -> Payload {
            Payload::record(Mirror)
        }
    }

    #[test]
    fn test_nested_datetimes_serialized() {
        // Scenario C
        let instant = Utc.with_ymd_and_hms(2025, 10, 25, 10, 0, 0).unwrap();
        let payload = Payload::object([
            ("createdAt", Payload::from(instant)),
            ("nested", Payload::object([("date", Payload::from(instant))])),
        ]);

        let json = normalizer().to_json_string(payload).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            json!({
                "createdAt": "2025-10-25T10:00:00.000Z",
                "nested": {"date": "2025-10-25T10:00:00.000Z"}
            })
        );
    }

    #[test]
    fn test_offset_folded_to_utc() {
        let local = FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 27, 6, 0, 0)
            .unwrap();
        let normalized = normalizer().normalize_outbound(Payload::from(local));
        assert_eq!(normalized, Payload::from("2025-10-26T23:00:00.000Z"));
    }

    #[test]
    fn test_round_trip_through_both_directions() {
        for value in ["2025-10-25T10:00:00.000Z", "2025-10-25T17:00:00.123+07:00", "2025-10-25"] {
            let inbound = normalizer().normalize_inbound(Payload::from(value));
            let outbound = normalizer().normalize_outbound(inbound);
            let back = parse_date_time(outbound.as_str().unwrap()).unwrap();
            assert_eq!(back, parse_date_time(value).unwrap());
        }
    }

    #[test]
    fn test_records_flattened() {
        let departs = Utc.with_ymd_and_hms(2025, 10, 27, 0, 0, 0).unwrap();
        let payload = Payload::object([(
            "flights",
            Payload::from(vec![Payload::record(StoredFlight { number: "VN123", departs })]),
        )]);

        let normalized = normalizer().normalize_outbound(payload);
        let value = serde_json::to_value(&normalized).unwrap();
        assert_eq!(
            value,
            json!({"flights": [{"flightNumber": "VN123", "departs": "2025-10-27T00:00:00.000Z"}]})
        );
    }

    #[test]
    fn test_self_referencing_record_terminates() {
        let normalizer = DateTimeNormalizer::new(8);
        assert_eq!(normalizer.normalize_outbound(Payload::record(Mirror)), Payload::Null);
        assert_eq!(normalizer.to_json_string(Payload::record(Mirror)).unwrap(), "null");
    }

    #[test]
    fn test_record_below_passed_through_subtree_is_null() {
        let payload = Payload::object([(
            "a",
            Payload::object([(
                "b",
                Payload::object([
                    ("c", Payload::record(Mirror)),
                    ("list", Payload::from(vec![Payload::record(Mirror)])),
                    ("d", Payload::from("kept")),
                ]),
            )]),
        )]);

        let normalized = DateTimeNormalizer::new(2).normalize_outbound(payload);
        let value = serde_json::to_value(&normalized).unwrap();
        assert_eq!(
            value,
            json!({"a": {"b": {"c": null, "list": [null], "d": "kept"}}})
        );
    }

    #[test]
    fn test_blob_passes_through() {
        let payload = Payload::object([("ticket", Payload::Blob(vec![0x25, 0x50, 0x44, 0x46]))]);
        let normalized = normalizer().normalize_outbound(payload.clone());
        assert_eq!(normalized, payload);
    }

    #[test]
    fn test_callables_and_undefined_dropped_null_kept() {
        let payload = Payload::object([
            ("save", Payload::Callable(Callable::new(|| Payload::Null))),
            ("bookingCode", Payload::Undefined),
            ("paymentMethod", Payload::Null),
            (
                "list",
                Payload::from(vec![
                    Payload::from(1u32),
                    Payload::Undefined,
                    Payload::Callable(Callable::new(|| Payload::Null)),
                ]),
            ),
        ]);

        let normalized = normalizer().normalize_outbound(payload);
        let map = normalized.as_object().unwrap();
        assert!(!map.contains_key("save"));
        assert!(!map.contains_key("bookingCode"));
        assert_eq!(map["paymentMethod"], Payload::Null);
        assert_eq!(
            map["list"],
            Payload::from(vec![Payload::from(1u32), Payload::Null, Payload::Null])
        );
    }

    #[test]
    fn test_shape_preserved_for_plain_json() {
        let source = json!({
            "a": [1, {"b": "2025-10-25"}, [null, false]],
            "c": {"d": {"e": "text"}}
        });
        let normalized = normalizer().normalize_outbound(Payload::from(source.clone()));
        assert_eq!(serde_json::to_value(&normalized).unwrap(), source);
    }

    #[test]
    fn test_depth_limit_passes_subtree_through() {
        let instant = Utc.with_ymd_and_hms(2025, 10, 25, 10, 0, 0).unwrap();
        let deep = (0..5).fold(Payload::from(instant), |inner, _| {
            Payload::object([("child", inner)])
        });
        let normalized = DateTimeNormalizer::new(2).normalize_outbound(deep.clone());

        let passed = normalized.get("child").and_then(|p| p.get("child")).unwrap();
        let original = deep.get("child").and_then(|p| p.get("child")).unwrap();
        assert_eq!(passed, original);
        // The serializer still renders the skipped date/time canonically.
        let json = serde_json::to_string(&normalized).unwrap();
        assert!(json.contains("2025-10-25T10:00:00.000Z"));
    }
}
