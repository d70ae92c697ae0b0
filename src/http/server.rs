//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all API handlers
//! - Wire up middleware (timeout, body limit, request ID, tracing, metrics)
//! - Install the outbound normalizer around every route
//! - Rate limit clients, answer CORS, add hardening headers
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, HeaderName, HeaderValue, Request},
    middleware,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::SecurityConfig;
use crate::config::AppConfig;
use crate::datetime::DateTimeNormalizer;
use crate::error::ApiError;
use crate::http::rate_limit::{rate_limit, RateLimiter};
use crate::http::response::{emit_json, status_as_json};
use crate::observability::metrics;
use crate::routes;
use crate::store::DocumentStore;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub normalizer: DateTimeNormalizer,
}

impl FromRef<AppState> for DateTimeNormalizer {
    fn from_ref(state: &AppState) -> Self {
        state.normalizer
    }
}

const CONTENT_SECURITY_POLICY: &str = "default-src 'self';\
    style-src 'self' 'unsafe-inline' https://cdn.tailwindcss.com https://cdnjs.cloudflare.com;\
    script-src 'self' 'unsafe-inline' https://cdn.tailwindcss.com https://cdnjs.cloudflare.com;\
    img-src 'self' data: https: http:;\
    font-src 'self' https://cdnjs.cloudflare.com;\
    connect-src 'self'";

/// Hardening headers added to every response that does not set its own.
const SECURITY_HEADERS: [(HeaderName, &str); 8] = [
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (HeaderName::from_static("cross-origin-opener-policy"), "same-origin"),
    (HeaderName::from_static("cross-origin-resource-policy"), "same-origin"),
];

/// HTTP server for the booking API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server over an empty store.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(config, Arc::new(DocumentStore::new()))
    }

    /// Create a server over an existing store.
    pub fn with_store(config: &AppConfig, store: Arc<DocumentStore>) -> Self {
        let state = AppState {
            store,
            normalizer: DateTimeNormalizer::from(&config.normalization),
        };
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let normalizer = state.normalizer;
        let security = &config.security;

        let mut router = Router::new()
            .nest("/api", routes::setup_api_router(state.clone()))
            .fallback(route_not_found)
            .with_state(state);

        if security.rate_limit_enabled {
            let limiter = Arc::new(RateLimiter::from_config(security));
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit));
        }

        let mut router = router
            .layer(middleware::map_response_with_state(normalizer, emit_json))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(status_as_json));

        if security.security_headers {
            for (name, value) in SECURITY_HEADERS {
                router = router.layer(SetResponseHeaderLayer::if_not_present(
                    name,
                    HeaderValue::from_static(value),
                ));
            }
        }

        router.layer(cors_layer(security))
    }

    /// A clone of the fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until Ctrl+C or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let service = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Any origin when none are configured; validation has already checked
/// configured origins.
fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("x-request-id")]);

    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Wait for Ctrl+C or the shutdown coordinator.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
        _ = shutdown.recv() => tracing::info!("Shutdown requested"),
    }
}
