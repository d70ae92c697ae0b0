//! Response emission.
//!
//! # Responsibilities
//! - `ApiResponse`: the one way handlers produce a body
//! - `emit_json`: run the outbound normalizer and write the JSON body
//! - `status_as_json`: give bare error statuses from outer layers the same
//!   JSON error shape
//!
//! # Design Decisions
//! - `ApiResponse` carries the payload to `emit_json` in a response
//!   extension; the router installs `emit_json` around every route, so a
//!   handler cannot put a date/time on the wire without normalization
//! - A serialization failure is logged and replaced with a fixed 500 body

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::datetime::{DateTimeNormalizer, Payload};

const FALLBACK_BODY: &str = r#"{"success":false,"message":"Something went wrong!"}"#;

/// A JSON response whose payload is normalized on emission.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    payload: Payload,
}

impl ApiResponse {
    pub fn new(status: StatusCode, payload: Payload) -> Self {
        Self { status, payload }
    }

    /// 200 with `success: true` merged into the given fields.
    pub fn ok<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Self::new(StatusCode::OK, success(fields))
    }

    /// 201 with `success: true` merged into the given fields.
    pub fn created<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Self::new(StatusCode::CREATED, success(fields))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

fn success<K, I>(fields: I) -> Payload
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Payload)>,
{
    let mut map: crate::datetime::Map = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
    map.insert("success".to_string(), Payload::from(true));
    Payload::Object(map)
}

/// Payload waiting for `emit_json`.
#[derive(Debug, Clone)]
struct PendingPayload(Payload);

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(PendingPayload(self.payload));
        response
    }
}

/// Response mapper: normalize and serialize any pending payload.
pub async fn emit_json(
    State(normalizer): State<DateTimeNormalizer>,
    mut response: Response,
) -> Response {
    let Some(PendingPayload(payload)) = response.extensions_mut().remove::<PendingPayload>()
    else {
        return response;
    };

    match normalizer.to_json_vec(payload) {
        Ok(body) => {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            *response.body_mut() = Body::from(body);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, status = %response.status(), "Failed to serialize response payload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                FALLBACK_BODY,
            )
                .into_response()
        }
    }
}

/// Response mapper for layers outside `emit_json` (timeout, body limit):
/// an error status without a JSON body becomes `{success:false,message}`
/// carrying the status reason.
pub async fn status_as_json(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = status.canonical_reason().unwrap_or("Request failed");
    let body = serde_json::json!({ "success": false, "message": message }).to_string();

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(body))
}
