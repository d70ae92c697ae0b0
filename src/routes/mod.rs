//! REST API routes.
//!
//! Handlers read requests through the normalizing extractors in
//! [`crate::http::request`] and answer with [`crate::http::ApiResponse`].

pub mod auth;
pub mod bookings;
pub mod flights;
pub mod health;
pub mod input;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::http::{require_auth, AppState};

/// All `/api` routes; nest under `/api`.
pub fn setup_api_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/user", get(bookings::list_user_bookings))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/change-password", post(users::change_password))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/flights/search", get(flights::search))
        .route("/flights/airports/list", get(flights::list_airports))
        .route("/flights/airlines/list", get(flights::list_airlines))
        .route("/flights/{id}", get(flights::get_flight))
        .merge(protected)
}
