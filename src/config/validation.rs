//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Refuse to expose the admin API with a placeholder key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route table checks live in routing (table construction)

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{SiteConfig, ADMIN_KEY_PLACEHOLDER};

/// A single semantic problem in the site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("health.path {0:?} must start with '/'")]
    InvalidHealthPath(String),

    #[error("health.path must not be under /admin")]
    HealthPathUnderAdmin,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("routes_path must not be empty")]
    EmptyRoutesPath,

    #[error("admin.api_key must be set when the admin API is enabled")]
    WeakAdminKey,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let health = &config.health.path;
    if !health.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(health.clone()));
    } else if health == "/admin" || health.starts_with("/admin/") {
        errors.push(ValidationError::HealthPathUnderAdmin);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.routes_path.0.trim().is_empty() {
        errors.push(ValidationError::EmptyRoutesPath);
    }

    if config.admin.enabled
        && (config.admin.api_key.trim().is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER)
    {
        errors.push(ValidationError::WeakAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
