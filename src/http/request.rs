//! Request extraction with date/time normalization.
//!
//! # Responsibilities
//! - `DateTimeJson`: JSON body, normalized recursively
//! - `DateTimeQuery`: query string, normalized flat
//! - `DateTimePath`: path parameters, normalized flat
//!
//! # Design Decisions
//! - Each extractor runs the inbound pass exactly once, before the handler
//! - The normalizer comes from router state through `FromRef`
//! - Repeated query keys and `key[]` keys collect into arrays

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, RawPathParams, Request},
    http::request::Parts,
    Json,
};
use serde_json::Value;
use std::convert::Infallible;

use crate::datetime::{DateTimeNormalizer, Params, Payload};
use crate::error::ApiError;

/// Normalized JSON request body.
#[derive(Debug, Clone)]
pub struct DateTimeJson(pub Payload);

impl<S> FromRequest<S> for DateTimeJson
where
    DateTimeNormalizer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        let normalizer = DateTimeNormalizer::from_ref(state);
        Ok(Self(normalizer.normalize_inbound(Payload::from(value))))
    }
}

/// Normalized query parameters.
#[derive(Debug, Clone, Default)]
pub struct DateTimeQuery(pub Params);

impl DateTimeQuery {
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.0.get(key)
    }
}

impl<S> FromRequestParts<S> for DateTimeQuery
where
    DateTimeNormalizer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = parse_query(parts.uri.query().unwrap_or_default());
        let normalizer = DateTimeNormalizer::from_ref(state);
        Ok(Self(normalizer.normalize_params(params)))
    }
}

/// Normalized path parameters.
#[derive(Debug, Clone, Default)]
pub struct DateTimePath(pub Params);

impl DateTimePath {
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.0.get(key)
    }
}

impl<S> FromRequestParts<S> for DateTimePath
where
    DateTimeNormalizer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        let params = raw
            .iter()
            .map(|(key, value)| (key.to_string(), Payload::from(value)))
            .collect();

        let normalizer = DateTimeNormalizer::from_ref(state);
        Ok(Self(normalizer.normalize_params(params)))
    }
}

/// Parse a raw query string into string-valued parameters.
///
/// A key seen once maps to a string. A key seen more than once, or written
/// as `key[]`, maps to an array of strings in order of appearance.
pub fn parse_query(query: &str) -> Params {
    let mut params = Params::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let (key, forced_array) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key.into_owned(), false),
        };
        let value = Payload::String(value.into_owned());

        match params.remove(&key) {
            Some(Payload::Array(mut items)) => {
                items.push(value);
                params.insert(key, Payload::Array(items));
            }
            Some(existing) => {
                params.insert(key, Payload::Array(vec![existing, value]));
            }
            None if forced_array => {
                params.insert(key, Payload::Array(vec![value]));
            }
            None => {
                params.insert(key, value);
            }
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_query_single_and_repeated() {
        let params = parse_query("departure=SGN&tag=a&tag=b&date=2025-10-25");
        assert_eq!(params["departure"], Payload::from("SGN"));
        assert_eq!(params["tag"], Payload::from(vec!["a", "b"]));
        assert_eq!(params["date"], Payload::from("2025-10-25"));
    }

    #[test]
    fn test_parse_query_bracket_keys_are_arrays() {
        let params = parse_query("dates[]=2025-01-01");
        assert_eq!(params["dates"], Payload::from(vec!["2025-01-01"]));
    }

    #[test]
    fn test_parse_query_decodes_percent_and_plus() {
        let params = parse_query("at=2025-10-25T10%3A00%3A00%2B07%3A00&q=a+b");
        assert_eq!(params["at"], Payload::from("2025-10-25T10:00:00+07:00"));
        assert_eq!(params["q"], Payload::from("a b"));
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(parse_query("").is_empty());
    }

    #[tokio::test]
    async fn test_query_extractor_normalizes_array_elements() {
        let request = HttpRequest::builder()
            .uri("/search?dates=2025-01-01&dates=2025-01-02&dates=nope")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let DateTimeQuery(params) =
            DateTimeQuery::from_request_parts(&mut parts, &DateTimeNormalizer::default())
                .await
                .unwrap();

        let dates = params["dates"].as_array().unwrap();
        assert_eq!(
            dates[0].as_datetime().unwrap(),
            &Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            dates[1].as_datetime().unwrap(),
            &Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(dates[2], Payload::from("nope"));
    }

    #[tokio::test]
    async fn test_json_extractor_normalizes_nested_body() {
        let request = HttpRequest::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"passengers":[{"dateOfBirth":"1990-01-01","name":"Binh"}]}"#,
            ))
            .unwrap();

        let DateTimeJson(body) = DateTimeJson::from_request(request, &DateTimeNormalizer::default())
            .await
            .unwrap();

        let passenger = &body.get("passengers").unwrap().as_array().unwrap()[0];
        assert!(passenger.get("dateOfBirth").unwrap().as_datetime().is_some());
        assert_eq!(passenger.get("name"), Some(&Payload::from("Binh")));
    }

    #[tokio::test]
    async fn test_json_extractor_rejects_malformed_body() {
        let request = HttpRequest::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = DateTimeJson::from_request(request, &DateTimeNormalizer::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_extractor_keeps_rejection_status() {
        let request = HttpRequest::builder()
            .method("POST")
            .body(Body::from(r#"{"email":"a@b.vn"}"#))
            .unwrap();

        let err = DateTimeJson::from_request(request, &DateTimeNormalizer::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
