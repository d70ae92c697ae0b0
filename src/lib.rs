//! Vivu flight booking API library.
//!
//! Every date/time crossing the HTTP boundary goes through [`datetime`]:
//! ISO-8601 strings in requests become native values before a handler runs,
//! and native values in responses leave as `YYYY-MM-DDTHH:mm:ss.sssZ`.

// Core
pub mod config;
pub mod datetime;
pub mod error;
pub mod http;
pub mod routes;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use datetime::DateTimeNormalizer;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::DocumentStore;
