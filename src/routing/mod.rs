//! Route derivation.
//!
//! # Responsibilities
//! - Normalize the request path (strip exactly one trailing slash)
//! - Derive an attribute-safe slug for the route
//!
//! # Design Decisions
//! - Pure functions, no I/O: derivation runs once per request and feeds
//!   both the body-class injection and the nav current-page matching
//! - The slug must be valid both as a single CSS class token and as an
//!   HTML attribute value, hence the conservative character set

pub mod route;

pub use route::{normalize_path, RouteContext};
