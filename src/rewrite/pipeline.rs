//! The single-pass streaming document transform.
//!
//! # Responsibilities
//! - Apply every rewrite rule in one pass over document order
//! - Keep the `<head>` append order fixed: primary stylesheet, then
//!   force-light stylesheet, then updated-time meta
//! - Replace header/footer chrome with resolved partials or fallbacks
//!
//! # Design Decisions
//! - lol_html element/text handlers over a tokenizer; no DOM is built,
//!   so memory stays flat on large documents
//! - All assets, the route and the captured instant are resolved before
//!   construction; handlers never suspend for I/O mid-element
//! - Injected markup is not re-tokenized by a streaming rewriter, so the
//!   nav current-page rule runs as a pre-pass over the header fragment
//!   before it is spliced in

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::errors::RewritingError;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, HtmlRewriter, RewriteStrSettings, Settings};

use crate::assets::SiteAssets;
use crate::freshness::Freshness;
use crate::rewrite::fallback::{FALLBACK_FOOTER, FALLBACK_HEADER, FALLBACK_NAV_STYLE};
use crate::rewrite::structured_data::stamp_date_modified;
use crate::routing::{normalize_path, RouteContext};

const PRIMARY_STYLESHEET_LINK: &str = r#"<link rel="stylesheet" href="/styles/main.css">"#;
const FORCE_LIGHT_STYLESHEET_LINK: &str =
    r#"<link rel="stylesheet" href="/styles/force-light.css">"#;
const STRUCTURED_DATA_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// One request's fully-resolved rewrite plan. Built after the asset
/// probes settle; immutable while the document streams through.
pub struct RewritePipeline {
    head_injection: String,
    header_fragment: String,
    footer_fragment: String,
    slug: String,
    iso_date: String,
    human_date: String,
}

impl RewritePipeline {
    pub fn new(assets: &SiteAssets, route: &RouteContext, freshness: &Freshness) -> Self {
        let mut head_injection = String::new();
        if assets.has_primary_stylesheet {
            head_injection.push_str(PRIMARY_STYLESHEET_LINK);
        } else {
            head_injection.push_str(FALLBACK_NAV_STYLE);
        }
        if assets.has_force_light_stylesheet {
            head_injection.push_str(FORCE_LIGHT_STYLESHEET_LINK);
        }
        head_injection.push_str(&format!(
            r#"<meta property="og:updated_time" content="{}">"#,
            freshness.iso_instant()
        ));

        let header_fragment = mark_current_nav(
            assets.header.as_deref().unwrap_or(FALLBACK_HEADER),
            &route.normalized_path,
        );
        let footer_fragment = assets
            .footer
            .as_deref()
            .unwrap_or(FALLBACK_FOOTER)
            .to_string();

        Self {
            head_injection,
            header_fragment,
            footer_fragment,
            slug: route.slug.clone(),
            iso_date: freshness.iso_date(),
            human_date: freshness.human_date(),
        }
    }

    /// Stream `input` through the rewriter and collect the final bytes.
    ///
    /// Tolerates malformed markup the way browsers do; a missing target
    /// element simply means the matching rule never fires.
    pub fn transform(&self, input: &[u8]) -> Result<Vec<u8>, RewritingError> {
        let mut output = Vec::with_capacity(input.len() + 1024);

        // Buffers structured-data text chunks until the end of the node.
        let ld_buffer = Rc::new(RefCell::new(String::new()));
        let ld_buf = ld_buffer.clone();
        let iso_date = self.iso_date.clone();

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("head", |el| {
                        el.append(&self.head_injection, ContentType::Html);
                        Ok(())
                    }),
                    element!("body", |el| {
                        let existing = el.get_attribute("class").unwrap_or_default();
                        let appended = format!("force-light page-{}", self.slug);
                        let merged = if existing.is_empty() {
                            appended
                        } else {
                            // Additive on purpose; no dedup of prior tokens.
                            format!("{existing} {appended}")
                        };
                        el.set_attribute("class", &merged)?;
                        el.set_attribute("data-route", &self.slug)?;
                        Ok(())
                    }),
                    element!("header", |el| {
                        el.set_inner_content(&self.header_fragment, ContentType::Html);
                        Ok(())
                    }),
                    element!("footer", |el| {
                        el.set_inner_content(&self.footer_fragment, ContentType::Html);
                        Ok(())
                    }),
                    element!("time[data-updated]", |el| {
                        el.set_attribute("datetime", &self.iso_date)?;
                        el.set_inner_content(&self.human_date, ContentType::Text);
                        Ok(())
                    }),
                    text!(STRUCTURED_DATA_SELECTOR, move |chunk| {
                        ld_buf.borrow_mut().push_str(chunk.as_str());
                        chunk.remove();
                        if chunk.last_in_text_node() {
                            let stamped = stamp_date_modified(&ld_buf.borrow(), &iso_date);
                            chunk.after(&stamped, ContentType::Html);
                            ld_buf.borrow_mut().clear();
                        }
                        Ok(())
                    }),
                ],
                ..Settings::new()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );

        rewriter.write(input)?;
        rewriter.end()?;
        Ok(output)
    }
}

/// Mark anchors in the header chrome whose href matches the normalized
/// request path. Runs over the fragment before injection; every match is
/// marked, none deduplicated.
fn mark_current_nav(fragment: &str, normalized_path: &str) -> String {
    let result = rewrite_str(
        fragment,
        RewriteStrSettings {
            element_content_handlers: vec![element!("nav a[href]", |el| {
                let href = el.get_attribute("href").unwrap_or_default();
                if normalize_path(&href) == normalized_path {
                    el.set_attribute("aria-current", "page")?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    match result {
        Ok(marked) => marked,
        Err(err) => {
            tracing::warn!(error = %err, "nav marking failed; injecting fragment unmarked");
            fragment.to_string()
        }
    }
}
