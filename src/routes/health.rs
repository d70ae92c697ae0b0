use crate::datetime::{self, Payload};
use crate::http::ApiResponse;

/// Liveness check with the server clock.
pub async fn health() -> ApiResponse {
    ApiResponse::ok([
        ("status", Payload::from("OK")),
        ("timestamp", Payload::from(datetime::now())),
    ])
}
