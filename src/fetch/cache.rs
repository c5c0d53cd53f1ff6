//! Cache store capability.
//!
//! # Responsibilities
//! - Narrow get/set-with-TTL interface over an arbitrary byte store
//! - In-memory implementation for single-process deployments
//!
//! # Design Decisions
//! - Best effort, fail open: a broken cache degrades to always-miss and must
//!   never fail or block a request
//! - `get` swallows backend errors internally; `set` reports them so the
//!   caller can log and move on

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Error from a cache write. Callers log these and continue.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache entry too large: {size} bytes")]
    EntryTooLarge { size: usize },

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Byte store with per-entry TTL.
///
/// Implementations must be safe for concurrent use by many in-flight
/// requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key. Absent, expired, and errored lookups all return `None`.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value under a key for `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

/// Entries above this size are refused rather than stored.
const MAX_ENTRY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
struct CacheEntry {
    expires_at: Instant,
    bytes: Vec<u8>,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe in-memory cache store.
///
/// Expired entries are evicted lazily on lookup.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        // The read guard is dropped before the expired entry is removed.
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_fresh() => return Some(entry.bytes.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        if value.len() > MAX_ENTRY_BYTES {
            return Err(CacheError::EntryTooLarge { size: value.len() });
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                expires_at: Instant::now() + ttl,
                bytes: value,
            },
        );
        Ok(())
    }
}
