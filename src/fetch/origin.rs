//! Origin fetching with cache-aside semantics.
//!
//! # Responsibilities
//! - Build the absolute origin URL for a requested path
//! - Consult the cache store before going to the network
//! - Issue the HTTP GET (redirects followed, basic auth, timeout)
//! - Write successful responses back to the cache
//! - Classify outcomes by status code
//!
//! # Design Decisions
//! - Cache failures never fail the fetch; a write error is logged and dropped
//! - No automatic retry; redirect following (max 3 hops) is the only
//!   built-in resilience
//! - One shared reqwest client; credentials are applied per request so no
//!   state can leak between concurrent fetches

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OriginConfig;
use crate::fetch::cache::CacheStore;
use crate::observability::metrics;

/// Maximum redirect hops followed on an origin fetch.
const MAX_REDIRECTS: usize = 3;

/// Error from an origin fetch.
///
/// Both variants are request-fatal for the caller; a 404 is not an error and
/// classifies as [`FetchOutcome::NotFound`] instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("origin request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("origin returned status {status}")]
    UpstreamStatus { status: u16 },
}

/// A response fetched from the origin.
///
/// Headers keep their wire order and may repeat; content-type resolution
/// takes the last value. Serializable so it can round-trip through the cache
/// store as bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Resolved content type: the last `Content-Type` header value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .last()
    }

    /// Body decoded as UTF-8 text (lossy).
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Classified result of an origin fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx, or a 3xx that survived redirect resolution.
    Success(FetchResult),
    /// Origin returned 404.
    NotFound,
}

/// Fetches origin content through the cache store.
///
/// Shared as a singleton across all in-flight requests.
pub struct OriginFetcher {
    client: reqwest::Client,
    cache: Arc<dyn CacheStore>,
    config: OriginConfig,
    ttl: Duration,
}

impl OriginFetcher {
    /// Build a fetcher for the configured origin.
    ///
    /// The per-request timeout reuses the cache TTL, mirroring the cache
    /// lifetime of the responses it produces.
    pub fn new(config: OriginConfig, cache: Arc<dyn CacheStore>) -> Result<Self, reqwest::Error> {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(ttl)
            .build()?;

        Ok(Self {
            client,
            cache,
            config,
            ttl,
        })
    }

    /// Fetch `path` from the origin, consulting the cache first.
    pub async fn fetch(&self, path: &str) -> Result<FetchOutcome, FetchError> {
        let url = self.absolute_url(path);
        let key = cache_key("GET", &url);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_slice::<FetchResult>(&cached) {
                Ok(result) => {
                    metrics::record_cache_lookup(true);
                    tracing::debug!(url = %url, "Serving origin response from cache");
                    return Ok(FetchOutcome::Success(result));
                }
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "Discarding undecodable cache entry");
                }
            }
        }
        metrics::record_cache_lookup(false);

        tracing::debug!(url = %url, "Fetching from origin");
        let mut request = self.client.get(&url);
        if let Some(auth) = &self.config.basic_auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        metrics::record_origin_fetch(status);

        let result = FetchResult {
            status,
            headers,
            body,
        };

        if result.is_success() {
            self.store(&key, &result).await;
            Ok(FetchOutcome::Success(result))
        } else if status == 404 {
            Ok(FetchOutcome::NotFound)
        } else {
            Err(FetchError::UpstreamStatus { status })
        }
    }

    /// Absolute URL for a requested path, query string included.
    fn absolute_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    async fn store(&self, key: &str, result: &FetchResult) {
        let encoded = match serde_json::to_vec(result) {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "Failed to encode response for caching");
                return;
            }
        };
        if let Err(error) = self.cache.set(key, encoded, self.ttl).await {
            tracing::warn!(key = %key, error = %error, "Cache write failed");
        }
    }
}

/// Canonical cache key for an outbound request.
fn cache_key(method: &str, url: &str) -> String {
    format!("{method}:{url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::cache::MemoryCacheStore;

    fn fetcher_for(origin: &str) -> OriginFetcher {
        let config = OriginConfig {
            base_url: origin.to_string(),
            ..OriginConfig::default()
        };
        OriginFetcher::new(config, Arc::new(MemoryCacheStore::new())).unwrap()
    }

    #[test]
    fn test_cache_key_is_method_and_url() {
        assert_eq!(
            cache_key("GET", "https://cms.example.com/a?b=c"),
            "GET:https://cms.example.com/a?b=c"
        );
    }

    #[test]
    fn test_absolute_url_forwards_path_and_query() {
        let fetcher = fetcher_for("https://cms.example.com");
        assert_eq!(
            fetcher.absolute_url("/page?draft=1"),
            "https://cms.example.com/page?draft=1"
        );
    }

    #[test]
    fn test_absolute_url_tolerates_trailing_slash() {
        let fetcher = fetcher_for("https://cms.example.com/");
        assert_eq!(
            fetcher.absolute_url("/page"),
            "https://cms.example.com/page"
        );
    }

    #[test]
    fn test_content_type_takes_last_value() {
        let result = FetchResult {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("content-type".to_string(), "text/html".to_string()),
            ],
            body: Vec::new(),
        };
        assert_eq!(result.content_type(), Some("text/html"));
    }

    #[test]
    fn test_content_type_absent() {
        let result = FetchResult {
            status: 200,
            headers: vec![("x-other".to_string(), "1".to_string())],
            body: Vec::new(),
        };
        assert_eq!(result.content_type(), None);
    }

    #[test]
    fn test_cached_result_round_trips_through_bytes() {
        let result = FetchResult {
            status: 200,
            headers: vec![("content-type".to_string(), "image/png".to_string())],
            body: vec![0, 159, 146, 150],
        };
        let encoded = serde_json::to_vec(&result).unwrap();
        let decoded: FetchResult = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(decoded.status, 200);
        assert_eq!(decoded.content_type(), Some("image/png"));
        assert_eq!(decoded.body, result.body);
    }
}
