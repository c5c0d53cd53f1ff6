//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mirror.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the asset mirror.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MirrorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin and CDN settings.
    pub origin: OriginConfig,

    /// Cache-control policy for proxied content classes.
    pub cache_policy: CachePolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin configuration.
///
/// The origin is the remote host whose content is mirrored. References to it
/// are rewritten so that navigation keeps flowing through this proxy, while
/// asset references may be pointed at an optional CDN prefix instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the content origin (required, e.g. "https://cms.example.com").
    pub base_url: String,

    /// Optional CDN base URL for rewritten asset references.
    /// When unset, asset references become origin-relative.
    pub cdn_url: Option<String>,

    /// Optional HTTP Basic credentials for origin requests.
    pub basic_auth: Option<BasicAuthConfig>,

    /// TTL in seconds for cached origin responses. Also reused as the
    /// per-request timeout on origin calls.
    pub cache_ttl_secs: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cdn_url: None,
            basic_auth: None,
            cache_ttl_secs: 604_800,
        }
    }
}

/// HTTP Basic credentials for the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

/// Outbound Cache-Control max-age per content class.
///
/// Composed HTML pages are always served uncacheable and are not configured
/// here; script, stylesheet, and opaque pass-through responses each get their
/// own max-age.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CachePolicyConfig {
    /// max-age in seconds for javascript responses.
    pub javascript_max_age_secs: u64,

    /// max-age in seconds for css responses.
    pub css_max_age_secs: u64,

    /// max-age in seconds for every other pass-through response.
    pub other_max_age_secs: u64,
}

impl Default for CachePolicyConfig {
    fn default() -> Self {
        Self {
            javascript_max_age_secs: 600,
            css_max_age_secs: 600,
            other_max_age_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Verbose logging (debug level for the crate).
    pub verbose: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
