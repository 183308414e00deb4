//! Key-value cache contract.
//!
//! Mirrors the subset of cache-server commands the application uses: string
//! values with expiry, and per-key hash maps with a whole-key expiry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the string value stored at `key`.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` at `key`. `ttl = None` keeps the value until deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes `key`. Missing keys are not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Returns one field of the hash stored at `key`.
    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    /// Inserts or overwrites one field of the hash stored at `key`.
    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()>;

    /// Removes one field of the hash stored at `key`, leaving sibling fields intact.
    async fn hdel(&self, key: &str, field: &str) -> CacheResult<()>;

    /// Sets the time-to-live of the whole `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()>;

    /// Checks that the cache server is reachable.
    async fn ping(&self) -> CacheResult<()>;
}

/// Shared handle to a cache backend.
pub type DynCache = Arc<dyn CacheStore>;
