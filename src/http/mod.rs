//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → rate_limit.rs (per-client token bucket)
//!     → auth.rs (bearer token → AuthUser, protected routes only)
//!     → request.rs (extract body/query/path, inbound normalization)
//!     → [route handler]
//!     → response.rs (outbound normalization, JSON body)
//!     → Send to client
//! ```

pub mod auth;
pub mod rate_limit;
pub mod request;
pub mod response;
pub mod server;

pub use auth::{require_auth, AuthUser};
pub use rate_limit::RateLimiter;
pub use request::{parse_query, DateTimeJson, DateTimePath, DateTimeQuery};
pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
