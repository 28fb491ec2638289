//! Cache provider trait for pluggable keyed-store backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for keyed stores with per-key TTL (Redis or in-memory).
///
/// The revocation store is built on top of this capability: it only ever
/// needs put-with-TTL and get. The provider is responsible for key
/// prefixing and TTL enforcement; no sweeping happens in the core.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Flush all entries from the cache.
    async fn flush_all(&self) -> AppResult<()>;
}
