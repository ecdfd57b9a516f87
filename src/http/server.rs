//! HTTP server setup and the transform handler.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all transform handler
//! - Wire up middleware (tracing, timeout, concurrency cap, request ID)
//! - Fetch the origin response and guard on content type
//! - Drive probes → pipeline → finalizer for HTML responses
//!
//! # Design Decisions
//! - Non-HTML responses stream through untouched, before any asset I/O
//! - One pipeline instance per request; nothing mutable is shared
//! - Transform logic never yields a 5xx of its own; only an unreachable
//!   origin does

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::HttpAssetStore;
use crate::config::SitewrapConfig;
use crate::freshness::Freshness;
use crate::http::request::{request_id, RequestIdLayer};
use crate::http::response::{finalize, FinalBody};
use crate::observability::metrics;
use crate::rewrite::RewritePipeline;
use crate::routing::RouteContext;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub assets: HttpAssetStore,
    pub origin_base: Arc<str>,
    pub build_instant: Option<Freshness>,
    pub max_body_bytes: usize,
}

/// HTTP server for the chrome-injection proxy.
pub struct HttpServer {
    router: Router,
    config: SitewrapConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SitewrapConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let assets = HttpAssetStore::new(config.asset_store.base_url.clone(), client.clone());

        // Validation already checked the format; a bad instant degrades
        // to per-request Last-Modified rather than refusing to start.
        let build_instant = config
            .build
            .commit_instant
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| Freshness::from_instant(parsed.with_timezone(&Utc)));

        let origin_base: Arc<str> =
            Arc::from(config.origin.base_url.trim_end_matches('/').to_string());

        let state = AppState {
            client,
            assets,
            origin_base,
            build_instant,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &SitewrapConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(transform_handler))
            .route("/", any(transform_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.base_url,
            asset_store = %self.config.asset_store.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SitewrapConfig {
        &self.config
    }
}

/// Main transform handler: origin fetch, content-type guard, rewrite,
/// finalize.
async fn transform_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let method_str = method.to_string();
    let path = request.uri().path().to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    // 1. Fetch the origin response, forwarding path, query and body.
    let uri = format!("{}{}", state.origin_base, path_and_query);
    let (parts, inbound_body) = request.into_parts();
    let mut origin_request = Request::builder().method(method.clone()).uri(uri);
    if let Some(headers) = origin_request.headers_mut() {
        for (name, value) in parts.headers.iter() {
            // The client sets Host from the origin URI; Accept-Encoding
            // is dropped because the rewriter needs identity-encoded
            // bytes to match anything.
            if name != header::HOST && name != header::ACCEPT_ENCODING {
                headers.insert(name.clone(), value.clone());
            }
        }
    }
    let origin_request = match origin_request.body(inbound_body) {
        Ok(r) => r,
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "Failed to build origin request");
            metrics::record_request(&method_str, 502, "error", start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let origin_response = match state.client.request(origin_request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "Origin unreachable");
            metrics::record_request(&method_str, 502, "error", start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let (parts, origin_body) = origin_response.into_parts();

    // 2. Content-type guard: anything that is not HTML streams through
    //    byte-identical, before any asset I/O is issued. An origin that
    //    compresses unconditionally gets the same treatment: compressed
    //    bytes would cross the rewriter unmatched.
    let is_html = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));
    let is_encoded = parts
        .headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|enc| !enc.eq_ignore_ascii_case("identity"));
    if !is_html || is_encoded {
        metrics::record_request(&method_str, parts.status.as_u16(), "passthrough", start);
        return Response::from_parts(parts, Body::new(origin_body)).into_response();
    }

    // 3. Pure per-request values; one instant for every injected date.
    let route = RouteContext::derive(&path);
    let freshness = Freshness::capture();
    let last_modified = state.build_instant.unwrap_or(freshness).http_date();

    // 4. HEAD: headers only; the body is never materialized or hashed
    //    and the asset probes are skipped with it.
    if method == Method::HEAD {
        metrics::record_request(&method_str, parts.status.as_u16(), "transformed", start);
        return finalize(parts, FinalBody::HeadersOnly, &last_modified).into_response();
    }

    // 5. Asset probes, concurrent and fail-soft, settled before the
    //    streaming pass starts.
    let assets = state.assets.resolve_site_assets().await;

    // Collect the origin body up front: the rewriter's handlers are not
    // Send, so the pass runs synchronously once all bytes are in hand,
    // and a rewriter failure needs the original bytes to fall back on.
    let mut original: Vec<u8> = Vec::new();
    let mut stream = Body::new(origin_body).into_data_stream();
    while let Some(next) = stream.next().await {
        let chunk = match next {
            Ok(chunk) => chunk,
            Err(error) => {
                tracing::error!(request_id = %request_id, error = %error, "Origin body read failed");
                metrics::record_request(&method_str, 502, "error", start);
                return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
            }
        };
        if original.len() + chunk.len() > state.max_body_bytes {
            // Over the transform buffer cap: serve the page untouched
            // rather than failing it, chaining the buffered prefix with
            // the remainder of the origin stream.
            tracing::warn!(
                request_id = %request_id,
                limit = state.max_body_bytes,
                "Origin body exceeds transform buffer cap; passing through untransformed"
            );
            metrics::record_request(&method_str, parts.status.as_u16(), "passthrough", start);
            original.extend_from_slice(&chunk);
            let buffered = stream::once(async move { Ok::<_, axum::Error>(Bytes::from(original)) });
            return Response::from_parts(parts, Body::from_stream(buffered.chain(stream)))
                .into_response();
        }
        original.extend_from_slice(&chunk);
    }

    // 6. One streaming pass; a rewriter failure degrades to the original
    //    bytes rather than a synthesized error status.
    let pipeline = RewritePipeline::new(&assets, &route, &freshness);
    let final_bytes = match pipeline.transform(&original) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(
                request_id = %request_id,
                error = %error,
                "Rewrite failed; serving original body"
            );
            original
        }
    };

    tracing::debug!(
        request_id = %request_id,
        slug = %route.slug,
        bytes = final_bytes.len(),
        "Transformed response"
    );
    metrics::record_request(&method_str, parts.status.as_u16(), "transformed", start);

    finalize(parts, FinalBody::Bytes(final_bytes), &last_modified).into_response()
}
