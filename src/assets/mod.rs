//! Content-store lookups for chrome partials and stylesheets.
//!
//! # Responsibilities
//! - Resolve the fixed logical asset paths against the content store
//! - Degrade every store failure to "absent" without surfacing an error
//! - Finish all probes before the rewrite pass starts
//!
//! # Design Decisions
//! - Existence and fetch are one call: an asset "exists" iff its payload
//!   came back, so there is never a probe/fetch double round trip
//! - The store lives under its own base URL, disjoint from the site's
//!   routable paths, so an asset lookup can never re-enter the transform
//! - No retries: a failed probe falls back immediately

pub mod store;

pub use store::{HttpAssetStore, SiteAssets};

/// Header chrome partial.
pub const HEADER_PARTIAL: &str = "/partials/header.html";
/// Footer chrome partial.
pub const FOOTER_PARTIAL: &str = "/partials/footer.html";
/// Primary stylesheet.
pub const PRIMARY_STYLESHEET: &str = "/styles/main.css";
/// Secondary probe path for stores keyed without the extension.
pub const PRIMARY_STYLESHEET_BARE: &str = "/styles/main";
/// Forced-light-theme stylesheet.
pub const FORCE_LIGHT_STYLESHEET: &str = "/styles/force-light.css";
