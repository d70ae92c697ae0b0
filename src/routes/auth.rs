//! Registration, login and session handlers.
//!
//! Tokens are opaque and held in memory; see [`DocumentStore::issue_token`].
//!
//! [`DocumentStore::issue_token`]: crate::store::DocumentStore::issue_token

use axum::extract::State;

use crate::datetime::Payload;
use crate::error::ApiError;
use crate::http::{ApiResponse, AppState, AuthUser, DateTimeJson};
use crate::routes::input::{is_valid_email, opt_secret, opt_str};
use crate::store::models::{hash_password, Role, User};

pub const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(
    State(state): State<AppState>,
    DateTimeJson(body): DateTimeJson,
) -> Result<ApiResponse, ApiError> {
    let profile = ["firstName", "lastName", "email", "phone"].map(|key| opt_str(&body, key));
    let secrets = ["password", "confirmPassword"].map(|key| opt_secret(&body, key));
    let (
        [Some(first_name), Some(last_name), Some(email), Some(phone)],
        [Some(password), Some(confirm)],
    ) = (profile, secrets)
    else {
        return Err(ApiError::bad_request("Tất cả các trường là bắt buộc"));
    };

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Email không hợp lệ"));
    }
    if password != confirm {
        return Err(ApiError::bad_request("Mật khẩu xác nhận không khớp"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Mật khẩu phải có ít nhất 6 ký tự"));
    }

    let user = state
        .store
        .insert_user(User {
            first_name,
            last_name,
            password_hash: hash_password(&email, &password),
            email,
            phone,
            date_of_birth: None,
            role: Role::User,
        })
        .ok_or_else(|| ApiError::Conflict("Email đã được sử dụng".into()))?;
    let token = state.store.issue_token(user.id);

    tracing::info!(user_id = %user.id, "User registered");
    Ok(ApiResponse::created([
        ("message", Payload::from("Đăng ký thành công")),
        ("user", Payload::from(user)),
        ("token", Payload::from(token)),
    ]))
}

pub async fn login(
    State(state): State<AppState>,
    DateTimeJson(body): DateTimeJson,
) -> Result<ApiResponse, ApiError> {
    let (Some(email), Some(password)) = (opt_str(&body, "email"), opt_secret(&body, "password"))
    else {
        return Err(ApiError::bad_request("Email và mật khẩu là bắt buộc"));
    };
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Email không hợp lệ"));
    }

    let user = state
        .store
        .find_user_by_email(&email)
        .filter(|user| user.data.password_matches(&password))
        .ok_or_else(|| ApiError::Unauthorized("Email hoặc mật khẩu không đúng".into()))?;
    let token = state.store.issue_token(user.id);

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::ok([
        ("user", Payload::from(user)),
        ("token", Payload::from(token)),
    ]))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResponse {
    state.store.revoke_token(&auth.token);
    ApiResponse::ok([("message", Payload::from("Đăng xuất thành công"))])
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .users
        .get(&auth.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok([("user", Payload::from(user))]))
}
