//! Response finalization.
//!
//! # Responsibilities
//! - Stamp the debug marker and the revalidate-always cache policy
//! - Set Last-Modified (build instant when configured, else the captured
//!   request instant) and the weak ETag validator
//! - Default Referrer-Policy / Content-Type only when the origin omitted
//!   them; never override explicit origin values
//! - Short-circuit HEAD: headers only, no body, no ETag
//!
//! # Design Decisions
//! - ETag is computed strictly after all rewrites, over the literal final
//!   bytes, and always overwrites any origin validator
//! - Stale Content-Length from the origin is dropped; the final body
//!   length differs after injection

use axum::body::Body;
use axum::http::response::Parts;
use axum::http::{header, HeaderValue, Response};
use sha2::{Digest, Sha256};

/// Marker header proving the response went through the transform.
pub const DEBUG_MARKER_HEADER: &str = "x-sitewrap";
/// Fixed marker value.
pub const DEBUG_MARKER_VALUE: &str = "chrome-v1";

const CACHE_CONTROL: &str = "public, max-age=0, must-revalidate";
const DEFAULT_REFERRER_POLICY: &str = "strict-origin-when-cross-origin";
const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Final body disposition after the pipeline.
pub enum FinalBody {
    /// HEAD request: the body is never materialized or hashed.
    HeadersOnly,
    /// Transformed bytes, materialized exactly once.
    Bytes(Vec<u8>),
}

/// Weak validator over the exact final bytes: SHA-256 truncated to
/// 16 hex characters, e.g. `W/"9f86d081884c7d65"`.
pub fn weak_etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let mut hex = String::with_capacity(16);
    for byte in &digest[..8] {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("W/\"{hex}\"")
}

/// Merge pipeline output with cache validators and policy headers.
/// Origin status and unrelated headers pass through untouched.
pub fn finalize(mut parts: Parts, body: FinalBody, last_modified: &str) -> Response<Body> {
    let headers = &mut parts.headers;

    headers.insert(
        DEBUG_MARKER_HEADER,
        HeaderValue::from_static(DEBUG_MARKER_VALUE),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL),
    );
    if let Ok(value) = HeaderValue::from_str(last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if !headers.contains_key(header::REFERRER_POLICY) {
        headers.insert(
            header::REFERRER_POLICY,
            HeaderValue::from_static(DEFAULT_REFERRER_POLICY),
        );
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
        );
    }

    // Recomputed from the final body by the server.
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);

    match body {
        FinalBody::HeadersOnly => {
            headers.remove(header::ETAG);
            Response::from_parts(parts, Body::empty())
        }
        FinalBody::Bytes(bytes) => {
            if let Ok(value) = HeaderValue::from_str(&weak_etag(&bytes)) {
                headers.insert(header::ETAG, value);
            }
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn origin_parts() -> Parts {
        let (parts, _) = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html")
            .header(header::ETAG, "\"origin-etag\"")
            .header("x-origin-custom", "kept")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_weak_etag_shape_and_determinism() {
        let a = weak_etag(b"final bytes");
        let b = weak_etag(b"final bytes");
        let c = weak_etag(b"other bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("W/\""));
        assert!(a.ends_with('"'));
        assert_eq!(a.len(), "W/\"\"".len() + 16);
        assert!(a[3..19].chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_finalize_get_overwrites_origin_validator() {
        let response = finalize(
            origin_parts(),
            FinalBody::Bytes(b"<html></html>".to_vec()),
            "Wed, 01 May 2024 12:00:00 GMT",
        );
        let headers = response.headers();
        assert_eq!(headers[DEBUG_MARKER_HEADER], DEBUG_MARKER_VALUE);
        assert_eq!(headers[header::CACHE_CONTROL], CACHE_CONTROL);
        assert_eq!(
            headers[header::LAST_MODIFIED],
            "Wed, 01 May 2024 12:00:00 GMT"
        );
        assert_eq!(headers[header::ETAG], weak_etag(b"<html></html>"));
        assert_eq!(headers["x-origin-custom"], "kept");
    }

    #[test]
    fn test_finalize_head_has_no_etag() {
        let response = finalize(
            origin_parts(),
            FinalBody::HeadersOnly,
            "Wed, 01 May 2024 12:00:00 GMT",
        );
        assert!(response.headers().get(header::ETAG).is_none());
        assert_eq!(response.headers()[DEBUG_MARKER_HEADER], DEBUG_MARKER_VALUE);
    }

    #[tokio::test]
    async fn test_finalize_head_body_empty() {
        let response = finalize(origin_parts(), FinalBody::HeadersOnly, "x");
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_explicit_origin_values_not_overridden() {
        let (parts, _) = Response::builder()
            .header(header::CONTENT_TYPE, "text/html; charset=iso-8859-1")
            .header(header::REFERRER_POLICY, "no-referrer")
            .body(())
            .unwrap()
            .into_parts();
        let response = finalize(parts, FinalBody::Bytes(vec![]), "x");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=iso-8859-1"
        );
        assert_eq!(response.headers()[header::REFERRER_POLICY], "no-referrer");
    }

    #[test]
    fn test_defaults_applied_when_origin_omits() {
        let (parts, _) = Response::builder().body(()).unwrap().into_parts();
        let response = finalize(parts, FinalBody::Bytes(vec![]), "x");
        assert_eq!(
            response.headers()[header::REFERRER_POLICY],
            DEFAULT_REFERRER_POLICY
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_origin_status_preserved() {
        let (parts, _) = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(())
            .unwrap()
            .into_parts();
        let response = finalize(parts, FinalBody::Bytes(b"<html>404</html>".to_vec()), "x");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
