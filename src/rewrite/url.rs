//! URL rewriting rules.
//!
//! # Responsibilities
//! - Strip the origin base URL out of references
//! - Decide between CDN-prefixed and proxy-relative form
//!
//! # Design Decisions
//! - Rules are compiled once from config into a small value; the
//!   per-reference operations are pure string rewrites
//! - Asset references may jump to the CDN because their content was already
//!   rewritten before caching; navigational references must stay local so the
//!   next hit flows back through the proxy

use crate::config::OriginConfig;

/// Compiled URL rewrite rules.
///
/// Built once from the origin configuration and shared read-only.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    origin: String,
    cdn: String,
}

impl UrlRewriter {
    /// Compile rewrite rules from the origin configuration.
    ///
    /// Trailing slashes are trimmed so that prefix concatenation never
    /// produces doubled separators.
    pub fn from_config(config: &OriginConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.cdn_url.clone().unwrap_or_default(),
        )
    }

    /// Create rules for an explicit origin and CDN prefix.
    /// An empty CDN prefix yields origin-relative references.
    pub fn new(origin: impl Into<String>, cdn: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            cdn: cdn.into().trim_end_matches('/').to_string(),
        }
    }

    /// The configured origin base URL.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Rewrite an asset reference to its CDN-or-local-relative form.
    ///
    /// The origin prefix is stripped; a reference that is still absolute
    /// (literal `http:` scheme, i.e. external) passes through unchanged,
    /// anything else gets the CDN prefix.
    pub fn to_local_or_cdn(&self, reference: &str) -> String {
        let stripped = self.strip_origin(reference);
        if stripped.starts_with("http:") {
            stripped
        } else {
            format!("{}{}", self.cdn, stripped)
        }
    }

    /// Rewrite a navigational reference to proxy-relative form.
    ///
    /// Navigation and form posts must keep resolving through this proxy so
    /// the referenced page can itself be fetched and composed on the next
    /// request.
    pub fn to_local(&self, reference: &str) -> String {
        self.strip_origin(reference)
    }

    /// Remove every literal occurrence of the origin base URL.
    pub fn strip_origin(&self, text: &str) -> String {
        if self.origin.is_empty() {
            return text.to_string();
        }
        text.replace(&self.origin, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://cms.example.com";
    const CDN: &str = "https://cdn.example.net";

    fn rewriter() -> UrlRewriter {
        UrlRewriter::new(ORIGIN, CDN)
    }

    #[test]
    fn test_asset_reference_gets_cdn_prefix() {
        assert_eq!(
            rewriter().to_local_or_cdn("https://cms.example.com/img/logo.png"),
            "https://cdn.example.net/img/logo.png"
        );
        assert_eq!(
            rewriter().to_local_or_cdn("/img/logo.png"),
            "https://cdn.example.net/img/logo.png"
        );
    }

    #[test]
    fn test_asset_reference_without_cdn_becomes_relative() {
        let rw = UrlRewriter::new(ORIGIN, "");
        assert_eq!(
            rw.to_local_or_cdn("https://cms.example.com/img/logo.png"),
            "/img/logo.png"
        );
    }

    #[test]
    fn test_external_absolute_reference_passes_through() {
        assert_eq!(
            rewriter().to_local_or_cdn("http://other.example.org/pixel.gif"),
            "http://other.example.org/pixel.gif"
        );
    }

    #[test]
    fn test_origin_never_survives_rewrite() {
        let result = rewriter().to_local_or_cdn("https://cms.example.com/a/b.css");
        assert!(!result.contains(ORIGIN));

        let result = rewriter().to_local("https://cms.example.com/page");
        assert!(!result.contains(ORIGIN));
    }

    #[test]
    fn test_navigational_reference_stays_local() {
        assert_eq!(
            rewriter().to_local("https://cms.example.com/about?tab=2"),
            "/about?tab=2"
        );
        assert_eq!(rewriter().to_local("/contact"), "/contact");
    }

    #[test]
    fn test_to_local_is_idempotent() {
        let once = rewriter().to_local("https://cms.example.com/about");
        let twice = rewriter().to_local(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_trailing_slash_trimmed_from_prefixes() {
        let rw = UrlRewriter::new("https://cms.example.com/", "https://cdn.example.net/");
        assert_eq!(
            rw.to_local_or_cdn("https://cms.example.com/x.png"),
            "https://cdn.example.net/x.png"
        );
    }

    #[test]
    fn test_strip_origin_removes_every_occurrence() {
        let text = "url(https://cms.example.com/a.png) url(https://cms.example.com/b.png)";
        assert_eq!(rewriter().strip_origin(text), "url(/a.png) url(/b.png)");
    }
}
