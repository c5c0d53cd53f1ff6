//! Caching asset-rewriting reverse proxy library.
//!
//! Fronts a remote content origin, rewrites HTML/URL references so the site
//! appears unified under this host, and composes fetched layout documents
//! with caller-supplied directives.

pub mod config;
pub mod fetch;
pub mod http;
pub mod observability;
pub mod rewrite;
pub mod routing;
pub mod transform;

pub use config::MirrorConfig;
pub use fetch::{CacheStore, MemoryCacheStore, OriginFetcher};
pub use http::{DirectiveHook, MirrorServer};
pub use rewrite::UrlRewriter;
pub use transform::LayoutComposer;
