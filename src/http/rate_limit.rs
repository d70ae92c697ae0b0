//! Per-client rate limiting.
//!
//! Each client IP gets a token bucket holding `max_requests` tokens that
//! refills evenly over the configured window, so a client may spend its
//! whole allowance in a burst and then regains it gradually.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::schema::SecurityConfig;
use crate::error::ApiError;
use crate::observability::metrics;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_per_sec: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Shared bucket table for the rate limit middleware.
pub struct RateLimiter {
    buckets: DashMap<Option<IpAddr>, TokenBucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let capacity = f64::from(max_requests);
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_sec: capacity / window.as_secs_f64().max(f64::EPSILON),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Take one token for `client`. Requests without a peer address share
    /// one bucket.
    pub fn check(&self, client: Option<IpAddr>) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: Option<IpAddr>, now: Instant) -> bool {
        self.buckets
            .entry(client)
            .or_insert_with(|| TokenBucket::new(self.capacity, now))
            .try_acquire(self.capacity, self.refill_per_sec, now)
    }
}

/// Middleware rejecting clients that exhausted their allowance with 429.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if limiter.check(client) {
        return next.run(request).await;
    }

    tracing::warn!(client = ?client, "Rate limit exceeded");
    metrics::record_rate_limited();
    ApiError::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: Option<IpAddr> = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    const OTHER: Option<IpAddr> = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));

    #[test]
    fn test_allowance_then_rejection() {
        let limiter = RateLimiter::new(3, Duration::from_secs(900));
        let now = Instant::now();

        assert!((0..3).all(|_| limiter.check_at(CLIENT, now)));
        assert!(!limiter.check_at(CLIENT, now));
        // Buckets are per client.
        assert!(limiter.check_at(OTHER, now));
    }

    #[test]
    fn test_tokens_refill_over_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at(CLIENT, start));
        assert!(limiter.check_at(CLIENT, start));
        assert!(!limiter.check_at(CLIENT, start));

        // One token every five seconds.
        assert!(limiter.check_at(CLIENT, start + Duration::from_secs(5)));
        assert!(!limiter.check_at(CLIENT, start + Duration::from_secs(5)));
        assert!(limiter.check_at(CLIENT, start + Duration::from_secs(60)));
    }
}
