//! HTTP client for the content store.

use axum::body::Body;
use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::assets::{
    FOOTER_PARTIAL, FORCE_LIGHT_STYLESHEET, HEADER_PARTIAL, PRIMARY_STYLESHEET,
    PRIMARY_STYLESHEET_BARE,
};

/// Cap on a single asset payload. Chrome partials and stylesheets are
/// small; anything larger is treated as absent.
const MAX_ASSET_BYTES: usize = 2 * 1024 * 1024;

/// Everything the rewrite pipeline needs from the content store,
/// resolved up front. Payload present == asset exists.
#[derive(Debug, Clone, Default)]
pub struct SiteAssets {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub has_primary_stylesheet: bool,
    pub has_force_light_stylesheet: bool,
}

/// Read-only client for the content store.
///
/// The store base URL is disjoint from the site's own routes; see
/// `config::validation` for the check that enforces it.
#[derive(Clone)]
pub struct HttpAssetStore {
    base_url: String,
    client: Client<HttpConnector, Body>,
}

impl HttpAssetStore {
    pub fn new(base_url: impl Into<String>, client: Client<HttpConnector, Body>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    /// Fetch one logical path. Any transport error, non-2xx status or
    /// oversized payload degrades to `None`; this never fails outward.
    pub async fn get(&self, path: &str) -> Option<String> {
        let uri = format!("{}{}", self.base_url, path);
        let request = Request::builder().uri(uri).body(Body::empty()).ok()?;

        let response = match self.client.request(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "asset probe failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(path = %path, status = %response.status(), "asset absent");
            return None;
        }

        match axum::body::to_bytes(Body::new(response.into_body()), MAX_ASSET_BYTES).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "asset body read failed");
                None
            }
        }
    }

    /// Run the four site-asset probes concurrently. All settle (payload
    /// or absent) before this returns, so the streaming pass never waits
    /// on the store mid-document.
    pub async fn resolve_site_assets(&self) -> SiteAssets {
        let (header, footer, primary, force_light) = tokio::join!(
            self.get(HEADER_PARTIAL),
            self.get(FOOTER_PARTIAL),
            self.get_primary_stylesheet(),
            self.get(FORCE_LIGHT_STYLESHEET),
        );

        SiteAssets {
            header,
            footer,
            has_primary_stylesheet: primary.is_some(),
            has_force_light_stylesheet: force_light.is_some(),
        }
    }

    // Some store deployments key stylesheets without the extension.
    async fn get_primary_stylesheet(&self) -> Option<String> {
        match self.get(PRIMARY_STYLESHEET).await {
            Some(css) => Some(css),
            None => self.get(PRIMARY_STYLESHEET_BARE).await,
        }
    }
}
