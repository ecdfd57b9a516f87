//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files;
//! every field has a default so a minimal (or empty) config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the chrome-injection proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SitewrapConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// The origin serving the pre-transform site.
    pub origin: OriginConfig,

    /// The content store holding chrome partials and stylesheets.
    pub asset_store: AssetStoreConfig,

    /// Optional build metadata (Last-Modified source).
    pub build: BuildConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body-size limits.
    pub limits: LimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the static site (e.g., "http://127.0.0.1:8788").
    pub base_url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8788".to_string(),
        }
    }
}

/// Content-store configuration.
///
/// The base URL must differ from the origin's: asset lookups live in
/// their own address space so they can never route back through this
/// proxy (validation enforces it).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetStoreConfig {
    /// Base URL of the content store (e.g., "http://127.0.0.1:8789").
    pub base_url: String,
}

impl Default for AssetStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8789".to_string(),
        }
    }
}

/// Build metadata.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BuildConfig {
    /// Commit/build instant (RFC 3339). When set, it becomes the
    /// Last-Modified value; otherwise the captured request instant is
    /// used.
    pub commit_instant: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// End-to-end request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Body-size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Cap on an origin HTML body buffered for transformation.
    pub max_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_deserializes_with_defaults() {
        let config: SitewrapConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.limits.max_body_bytes, 8 * 1024 * 1024);
        assert!(config.build.commit_instant.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_config_overrides() {
        let config: SitewrapConfig = toml::from_str(
            r#"
            [origin]
            base_url = "http://10.0.0.5:8080"

            [build]
            commit_instant = "2024-05-01T12:00:00Z"
            "#,
        )
        .unwrap();
        assert_eq!(config.origin.base_url, "http://10.0.0.5:8080");
        assert_eq!(
            config.build.commit_instant.as_deref(),
            Some("2024-05-01T12:00:00Z")
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
