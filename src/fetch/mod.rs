//! Origin fetching subsystem.
//!
//! # Data Flow
//! ```text
//! requested path
//!     → origin.rs (absolute URL, cache key)
//!     → cache.rs (cache-aside read)
//!     → network GET on miss (redirects ≤ 3, basic auth, timeout)
//!     → cache.rs (write-back of successful responses, fail-open)
//!     → FetchOutcome (Success | NotFound) or FetchError
//! ```

pub mod cache;
pub mod origin;

pub use cache::{CacheError, CacheStore, MemoryCacheStore};
pub use origin::{FetchError, FetchOutcome, FetchResult, OriginFetcher};
