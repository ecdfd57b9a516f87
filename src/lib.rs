//! Serve-time chrome injection proxy for static HTML sites.

pub mod assets;
pub mod config;
pub mod freshness;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod routing;

pub use config::SitewrapConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
