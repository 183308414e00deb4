//! Cache-aside reads.
//!
//! The cache is an optimization: a failing or corrupt cache degrades to a
//! direct read from storage, never to a failed request.

use std::future::Future;
use std::time::Duration;

use folio_storage::CacheStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Returns the value cached at `key`, or loads it and caches the result.
///
/// `None` from the loader is passed through and not cached, so a later write
/// becomes visible without waiting for the TTL.
pub async fn cache_aside<T, E, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    loader: F,
) -> Result<Option<T>, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                return Ok(Some(value));
            }
            Err(e) => tracing::warn!(key, error = %e, "discarding undecodable cache entry"),
        },
        Ok(None) => tracing::debug!(key, "cache miss"),
        Err(e) => tracing::warn!(key, error = %e, "cache read failed"),
    }

    let loaded = loader().await?;
    if let Some(value) = &loaded {
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(e) = cache.set(key, &raw, Some(ttl)).await {
                    tracing::warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "cache encode failed"),
        }
    }
    Ok(loaded)
}

/// Deletes `key`, logging instead of failing.
pub async fn invalidate(cache: &dyn CacheStore, key: &str) {
    if let Err(e) = cache.del(key).await {
        tracing::warn!(key, error = %e, "cache invalidation failed");
    }
}
