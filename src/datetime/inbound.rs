//! Request-side normalization: ISO-8601 strings become native date/times.
//!
//! # Responsibilities
//! - Recursive conversion of structured bodies
//! - Flat conversion of query/path parameters (arrays element-wise)
//! - Pass through everything that is not a matching string
//!
//! # Design Decisions
//! - A string that fails to parse is kept verbatim (per-leaf fail-soft)
//! - Native date/times are left as they are, so the pass is idempotent

use crate::datetime::format::parse_date_time;
use crate::datetime::{DateTimeNormalizer, Params, Payload};
use crate::observability::metrics;

impl DateTimeNormalizer {
    /// Normalize a request body of any shape.
    pub fn normalize_inbound(&self, payload: Payload) -> Payload {
        self.inbound_at(payload, 0)
    }

    /// Normalize flat query or path parameters.
    ///
    /// Array-valued parameters are mapped element-wise; nothing deeper is
    /// visited.
    pub fn normalize_params(&self, params: Params) -> Params {
        params
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Payload::Array(items) => {
                        Payload::Array(items.into_iter().map(parse_leaf).collect())
                    }
                    other => parse_leaf(other),
                };
                (key, value)
            })
            .collect()
    }

    fn inbound_at(&self, payload: Payload, depth: usize) -> Payload {
        match payload {
            Payload::Array(_) | Payload::Object(_) if depth >= self.max_depth => {
                tracing::warn!(
                    depth,
                    max_depth = self.max_depth,
                    kind = payload.kind(),
                    "Inbound payload exceeds depth limit, passing subtree through"
                );
                metrics::record_depth_limit("inbound");
                payload
            }
            Payload::Array(items) => Payload::Array(
                items
                    .into_iter()
                    .map(|item| self.inbound_at(item, depth + 1))
                    .collect(),
            ),
            Payload::Object(map) => Payload::Object(
                map.into_iter()
                    .map(|(key, value)| (key, self.inbound_at(value, depth + 1)))
                    .collect(),
            ),
            other => parse_leaf(other),
        }
    }
}

/// Convert a single matching string; anything else is returned as is.
fn parse_leaf(payload: Payload) -> Payload {
    match payload {
        Payload::String(value) => match parse_date_time(&value) {
            Some(parsed) => Payload::DateTime(parsed),
            None => Payload::String(value),
        },
        other => other,
    }
}
