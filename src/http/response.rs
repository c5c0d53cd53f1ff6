//! Outbound response construction.
//!
//! # Responsibilities
//! - Build client responses for each content class
//! - Apply the per-class Cache-Control policy
//! - Map fetch/composition failures to outbound status codes

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::CachePolicyConfig;
use crate::fetch::FetchResult;
use crate::routing::ContentClass;

/// Cache directives for composed pages. Overrides and injections are
/// request-specific, so a composed page must never be cached.
pub const UNCACHEABLE: &str = "no-cache, no-store, must-revalidate, max-age=0";

/// Resolve the Cache-Control value for a content class.
pub fn cache_control_for(class: ContentClass, policy: &CachePolicyConfig) -> String {
    match class {
        ContentClass::Html => UNCACHEABLE.to_string(),
        ContentClass::Javascript => format!("max-age={}", policy.javascript_max_age_secs),
        ContentClass::Css => format!("max-age={}", policy.css_max_age_secs),
        ContentClass::Other => format!("max-age={}", policy.other_max_age_secs),
    }
}

/// A composed HTML page.
pub fn composed_page(html: String, cache_control: &str) -> Response {
    build(
        StatusCode::OK,
        Some("text/html; charset=utf-8"),
        cache_control,
        Body::from(html),
    )
}

/// A script or stylesheet whose origin references were masked.
pub fn text_asset(body: String, content_type: Option<&str>, cache_control: &str) -> Response {
    build(StatusCode::OK, content_type, cache_control, Body::from(body))
}

/// An opaque pass-through of the origin response body.
pub fn passthrough(result: FetchResult, cache_control: &str) -> Response {
    let content_type = result.content_type().map(str::to_string);
    build(
        StatusCode::OK,
        content_type.as_deref(),
        cache_control,
        Body::from(result.body),
    )
}

pub fn not_found() -> Response {
    plain_status(StatusCode::NOT_FOUND)
}

pub fn bad_gateway() -> Response {
    plain_status(StatusCode::BAD_GATEWAY)
}

pub fn internal_error() -> Response {
    plain_status(StatusCode::INTERNAL_SERVER_ERROR)
}

fn plain_status(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn build(
    status: StatusCode,
    content_type: Option<&str>,
    cache_control: &str,
    body: Body,
) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(value) = content_type.and_then(|ct| HeaderValue::from_str(ct).ok()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CachePolicyConfig {
        CachePolicyConfig::default()
    }

    #[test]
    fn test_html_is_uncacheable() {
        assert_eq!(
            cache_control_for(ContentClass::Html, &policy()),
            "no-cache, no-store, must-revalidate, max-age=0"
        );
    }

    #[test]
    fn test_script_and_style_max_ages() {
        assert_eq!(
            cache_control_for(ContentClass::Javascript, &policy()),
            "max-age=600"
        );
        assert_eq!(cache_control_for(ContentClass::Css, &policy()), "max-age=600");
    }

    #[test]
    fn test_other_max_age() {
        assert_eq!(
            cache_control_for(ContentClass::Other, &policy()),
            "max-age=86400"
        );
    }

    #[test]
    fn test_passthrough_keeps_content_type() {
        let result = FetchResult {
            status: 200,
            headers: vec![("content-type".to_string(), "image/png".to_string())],
            body: vec![1, 2, 3],
        };
        let response = passthrough(result, "max-age=86400");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=86400"
        );
    }
}
