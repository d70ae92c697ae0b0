//! Bearer-token authentication middleware.
//!
//! Resolves `Authorization: Bearer <token>` against the store's session
//! tokens and attaches an [`AuthUser`] to the request.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::server::AppState;

/// The caller of an authenticated route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return ApiError::Unauthorized("Access token required".into()).into_response();
    };

    let Some(user_id) = state.store.resolve_token(&token) else {
        tracing::debug!("Rejected unknown bearer token");
        return ApiError::Unauthorized("Invalid token".into()).into_response();
    };

    if state.store.users.get(&user_id).is_none() {
        state.store.revoke_token(&token);
        return ApiError::Unauthorized("User not found".into()).into_response();
    }

    req.extensions_mut().insert(AuthUser { user_id, token });
    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
    }
}
