//! Path normalization and slug derivation.

/// Normalized request path plus its slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// Request path with exactly one trailing slash removed (`/` becomes ``).
    pub normalized_path: String,
    /// Attribute-safe route token; `home` for the root route.
    pub slug: String,
}

impl RouteContext {
    /// Derive the route context from a raw request path.
    pub fn derive(path: &str) -> Self {
        let normalized = normalize_path(path);
        let slug = derive_slug(normalized);
        Self {
            normalized_path: normalized.to_string(),
            slug,
        }
    }
}

/// Strip exactly one trailing slash. `/financing/` → `/financing`, `/` → ``.
pub fn normalize_path(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

fn derive_slug(normalized: &str) -> String {
    let stripped = normalized.strip_prefix('/').unwrap_or(normalized);
    if stripped.is_empty() {
        return "home".to_string();
    }
    stripped
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_home() {
        let route = RouteContext::derive("/");
        assert_eq!(route.normalized_path, "");
        assert_eq!(route.slug, "home");
    }

    #[test]
    fn test_plain_page() {
        let route = RouteContext::derive("/financing");
        assert_eq!(route.normalized_path, "/financing");
        assert_eq!(route.slug, "financing");
    }

    #[test]
    fn test_trailing_slash_stripped_once() {
        assert_eq!(normalize_path("/financing/"), "/financing");
        // Only one slash is stripped; a double slash leaves one behind.
        assert_eq!(normalize_path("/financing//"), "/financing/");
        assert_eq!(RouteContext::derive("/financing/").slug, "financing");
    }

    #[test]
    fn test_unsafe_characters_become_dashes() {
        assert_eq!(RouteContext::derive("/blog/my-post!").slug, "blog-my-post-");
    }

    #[test]
    fn test_underscores_and_digits_survive() {
        assert_eq!(RouteContext::derive("/faq_2024").slug, "faq_2024");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(RouteContext::derive("").slug, "home");
    }
}
