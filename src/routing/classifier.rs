//! Content classification.
//!
//! # Responsibilities
//! - Map a resolved content-type header value to a handling class
//!
//! # Design Decisions
//! - Substring matching, mirroring how origins actually vary parameters and
//!   vendor prefixes (`text/javascript`, `application/javascript;charset=..`)
//! - Missing content type falls back to opaque pass-through
//! - No regex to guarantee O(n) matching

/// How a fetched response is handled and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Composable HTML layout; never cached downstream.
    Html,
    /// Script text; origin references masked, short max-age.
    Javascript,
    /// Stylesheet text; origin references masked, short max-age.
    Css,
    /// Opaque pass-through with the default max-age.
    Other,
}

impl ContentClass {
    /// Classify a resolved content-type header value.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(value) if value.contains("text/html") => ContentClass::Html,
            Some(value) if value.contains("javascript") => ContentClass::Javascript,
            Some(value) if value.contains("css") => ContentClass::Css,
            _ => ContentClass::Other,
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentClass::Html => "html",
            ContentClass::Javascript => "javascript",
            ContentClass::Css => "css",
            ContentClass::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_with_charset() {
        assert_eq!(
            ContentClass::from_content_type(Some("text/html; charset=utf-8")),
            ContentClass::Html
        );
    }

    #[test]
    fn test_javascript_variants() {
        assert_eq!(
            ContentClass::from_content_type(Some("application/javascript")),
            ContentClass::Javascript
        );
        assert_eq!(
            ContentClass::from_content_type(Some("text/javascript;charset=UTF-8")),
            ContentClass::Javascript
        );
    }

    #[test]
    fn test_css() {
        assert_eq!(
            ContentClass::from_content_type(Some("text/css")),
            ContentClass::Css
        );
    }

    #[test]
    fn test_binary_and_missing_are_other() {
        assert_eq!(
            ContentClass::from_content_type(Some("image/png")),
            ContentClass::Other
        );
        assert_eq!(ContentClass::from_content_type(None), ContentClass::Other);
    }
}
