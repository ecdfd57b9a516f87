//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, origin fetch, content-type guard)
//!     → request.rs (request ID stamping)
//!     → [assets resolved, pipeline streams the document]
//!     → response.rs (finalize: marker, cache policy, validators)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, RequestIdLayer, X_REQUEST_ID};
pub use response::{finalize, weak_etag, FinalBody, DEBUG_MARKER_HEADER, DEBUG_MARKER_VALUE};
pub use server::HttpServer;
