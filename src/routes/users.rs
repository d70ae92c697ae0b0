//! Profile handlers for the authenticated caller.

use axum::extract::State;

use crate::datetime::Payload;
use crate::error::ApiError;
use crate::http::{ApiResponse, AppState, AuthUser, DateTimeJson};
use crate::routes::auth::MIN_PASSWORD_LEN;
use crate::routes::input::{opt_nullable_datetime, opt_secret, opt_str};
use crate::store::models::hash_password;

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .users
        .get(&auth.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok([("user", Payload::from(user))]))
}

/// Partial update. Absent fields are kept; `dateOfBirth: null` clears the
/// birth date.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    DateTimeJson(body): DateTimeJson,
) -> Result<ApiResponse, ApiError> {
    let first_name = opt_str(&body, "firstName");
    let last_name = opt_str(&body, "lastName");
    let phone = opt_str(&body, "phone");
    let date_of_birth = opt_nullable_datetime(&body, "dateOfBirth")?;

    let user = state
        .store
        .users
        .update(&auth.user_id, |user| {
            if let Some(first_name) = first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                user.last_name = last_name;
            }
            if let Some(phone) = phone {
                user.phone = phone;
            }
            if let Some(date_of_birth) = date_of_birth {
                user.date_of_birth = date_of_birth;
            }
        })
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");
    Ok(ApiResponse::ok([
        ("message", Payload::from("Profile updated successfully")),
        ("user", Payload::from(user)),
    ]))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    DateTimeJson(body): DateTimeJson,
) -> Result<ApiResponse, ApiError> {
    let (Some(current), Some(new)) = (
        opt_secret(&body, "currentPassword"),
        opt_secret(&body, "newPassword"),
    ) else {
        return Err(ApiError::bad_request("currentPassword and newPassword are required"));
    };
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Mật khẩu phải có ít nhất 6 ký tự"));
    }

    state
        .store
        .users
        .try_update(&auth.user_id, |user| {
            if !user.password_matches(&current) {
                return Err(ApiError::bad_request("Current password is incorrect"));
            }
            user.password_hash = hash_password(&user.email, &new);
            Ok(())
        })
        .ok_or_else(|| ApiError::not_found("User not found"))??;

    tracing::info!(user_id = %auth.user_id, "Password changed");
    Ok(ApiResponse::ok([(
        "message",
        Payload::from("Password changed successfully"),
    )]))
}
