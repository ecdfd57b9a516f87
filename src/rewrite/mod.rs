//! Streaming HTML rewriting.
//!
//! # Data Flow
//! ```text
//! resolved assets + route + captured instant
//!     → pipeline.rs (RewritePipeline: one lol_html pass)
//!         → fallback.rs (built-in chrome when partials are absent)
//!         → structured_data.rs (ld+json timestamp patch)
//!     → final bytes for the response finalizer
//! ```

pub mod fallback;
pub mod pipeline;
pub mod structured_data;

pub use pipeline::RewritePipeline;
