//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, depth within bounds)
//! - Validate addresses and log levels before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// Upper bound for `normalization.max_depth`.
pub const MAX_NORMALIZATION_DEPTH: usize = 512;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error(
        "normalization.max_depth must be between 1 and {max}, got {0}",
        max = MAX_NORMALIZATION_DEPTH
    )]
    MaxDepthOutOfRange(usize),

    #[error("observability.log_level '{0}' is not a valid filter")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("security.rate_limit_max_requests and rate_limit_window_secs must be greater than zero")]
    ZeroRateLimit,

    #[error("security.cors_allowed_origins entry '{0}' is not a valid origin")]
    InvalidCorsOrigin(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let depth = config.normalization.max_depth;
    if depth == 0 || depth > MAX_NORMALIZATION_DEPTH {
        errors.push(ValidationError::MaxDepthOutOfRange(depth));
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let security = &config.security;
    if security.rate_limit_enabled
        && (security.rate_limit_max_requests == 0 || security.rate_limit_window_secs == 0)
    {
        errors.push(ValidationError::ZeroRateLimit);
    }

    for origin in &security.cors_allowed_origins {
        let parsed = url::Url::parse(origin).ok().filter(|url| url.has_host());
        if parsed.is_none() || HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidCorsOrigin(origin.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.normalization.max_depth = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("not-an-address".into()),
                ValidationError::ZeroRequestTimeout,
                ValidationError::MaxDepthOutOfRange(0),
            ]
        );
    }

    #[test]
    fn test_depth_upper_bound() {
        let mut config = AppConfig::default();
        config.normalization.max_depth = MAX_NORMALIZATION_DEPTH;
        assert!(validate_config(&config).is_ok());

        config.normalization.max_depth = MAX_NORMALIZATION_DEPTH + 1;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MaxDepthOutOfRange(MAX_NORMALIZATION_DEPTH + 1)])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("nowhere".into())])
        );
    }

    #[test]
    fn test_security_settings_checked() {
        let mut config = AppConfig::default();
        config.security.cors_allowed_origins =
            vec!["https://keypicksvivu.com".into(), "not an origin".into()];
        config.security.rate_limit_window_secs = 0;

        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::ZeroRateLimit,
                ValidationError::InvalidCorsOrigin("not an origin".into()),
            ])
        );

        config.security.rate_limit_enabled = false;
        config.security.cors_allowed_origins.pop();
        assert!(validate_config(&config).is_ok());
    }
}
