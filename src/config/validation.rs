//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin and asset-store address spaces are disjoint
//! - Validate value ranges and parseable addresses/instants
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: SitewrapConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use chrono::DateTime;
use thiserror::Error;
use url::Url;

use crate::config::schema::SitewrapConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BadBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    BadMetricsAddress(String),

    #[error("{field} {value:?} is not a valid http(s) URL")]
    BadBaseUrl { field: &'static str, value: String },

    #[error("asset_store.base_url equals origin.base_url; asset lookups would re-enter the proxy")]
    StoreOverlapsOrigin,

    #[error("build.commit_instant {0:?} is not a valid RFC 3339 instant")]
    BadCommitInstant(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &SitewrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let origin = check_base_url(&mut errors, "origin.base_url", &config.origin.base_url);
    let store = check_base_url(
        &mut errors,
        "asset_store.base_url",
        &config.asset_store.base_url,
    );

    // The self-referential fetch guard: the store must not be addressable
    // through the site's own routes.
    if let (Some(origin), Some(store)) = (origin, store) {
        if origin == store {
            errors.push(ValidationError::StoreOverlapsOrigin);
        }
    }

    if let Some(instant) = &config.build.commit_instant {
        if DateTime::parse_from_rfc3339(instant).is_err() {
            errors.push(ValidationError::BadCommitInstant(instant.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => {
            errors.push(ValidationError::BadBaseUrl {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
