//! Built-in chrome used when the content store has no partials.
//!
//! The fragments keep the page contract intact (logo link, primary nav
//! list with site routes) so the nav current-page marking and the
//! fallback stylesheet still have something to work on.

/// Header chrome injected when `/partials/header.html` is absent.
pub const FALLBACK_HEADER: &str = r#"<a class="logo" href="/">Hearthside Exteriors</a>
<nav aria-label="Primary">
  <ul>
    <li><a href="/">Home</a></li>
    <li><a href="/costs">Costs</a></li>
    <li><a href="/financing">Financing</a></li>
    <li><a href="/contact">Contact</a></li>
  </ul>
</nav>"#;

/// Footer chrome injected when `/partials/footer.html` is absent.
pub const FALLBACK_FOOTER: &str = r#"<p class="footer-copy">&copy; Hearthside Exteriors. All rights reserved.</p>
<nav aria-label="Footer">
  <ul>
    <li><a href="/privacy">Privacy</a></li>
    <li><a href="/contact">Contact</a></li>
  </ul>
</nav>"#;

/// Inline style injected when the primary stylesheet asset is absent;
/// keeps the nav list items from stacking into each other unstyled.
pub const FALLBACK_NAV_STYLE: &str = "<style>header nav ul{display:flex;flex-wrap:wrap;gap:1rem 1.5rem;list-style:none;margin:0;padding:0}header nav a{text-decoration:none}</style>";
