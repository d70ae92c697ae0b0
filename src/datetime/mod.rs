//! DateTime normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Request body / query / path
//!     → http::request extractors
//!     → inbound.rs (ISO-8601 strings → native date/times)
//!     → handler (business logic sees native values)
//!     → http::response::ApiResponse
//!     → outbound.rs (native date/times → canonical strings, records flattened)
//!     → JSON on the wire
//! ```
//!
//! # Design Decisions
//! - Detection is purely value-format based; field names are never consulted
//! - Both directions are pure functions over an owned tree, safe to call
//!   concurrently without coordination
//! - Traversal depth is bounded; past the limit a subtree is passed through
//!   unmodified instead of failing the request
//! - One `DateTimeNormalizer` is built from config at startup and injected
//!   through application state

pub mod format;
pub mod inbound;
pub mod outbound;
pub mod payload;

pub use format::{is_date_time_string, now, parse_date_time, to_canonical};
pub use payload::{Callable, Map, Params, Payload, PlainData};

use crate::config::NormalizationConfig;

/// Default maximum container nesting the normalizers descend into.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Converts payloads between wire strings and native date/times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeNormalizer {
    max_depth: usize,
}

impl DateTimeNormalizer {
    /// Create a normalizer that descends at most `max_depth` containers.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for DateTimeNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl From<&NormalizationConfig> for DateTimeNormalizer {
    fn from(config: &NormalizationConfig) -> Self {
        Self::new(config.max_depth)
    }
}
