//! Redis-backed [`CacheStore`] and backend selection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use folio_storage::{CacheError, CacheResult, CacheStore, DynCache};
use redis::AsyncCommands;

use crate::config::RedisConfig;

/// Cache store over a pooled Redis connection.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("pool_status", &self.pool.status())
            .finish()
    }
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds a pool from `config` without connecting.
    pub fn from_config(config: &RedisConfig) -> CacheResult<Self> {
        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = PoolConfig::new(config.pool_size);
        let timeout = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.wait = timeout;
        pool_config.timeouts.create = timeout;
        pool_config.timeouts.recycle = timeout;
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    async fn conn(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

fn command_error(e: redis::RedisError) -> CacheError {
    CacheError::Command(e.to_string())
}

/// Redis expiries are whole seconds; sub-second TTLs round up so they never
/// become "no expiry".
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 || secs == 0 {
        secs + 1
    } else {
        secs
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key).await.map_err(command_error)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
                .await
                .map_err(command_error),
            None => conn.set::<_, _, ()>(key, value).await.map_err(command_error),
        }
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await.map_err(command_error)
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.hget::<_, _, Option<String>>(key, field)
            .await
            .map_err(command_error)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        conn.hset::<_, _, _, ()>(key, field, value)
            .await
            .map_err(command_error)
    }

    async fn hdel(&self, key: &str, field: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        conn.hdel::<_, _, ()>(key, field).await.map_err(command_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let secs = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        let mut conn = self.conn().await?;
        conn.expire::<_, ()>(key, secs).await.map_err(command_error)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }
}

/// Create a cache backend based on configuration.
///
/// ## Cache Modes
///
/// - **Redis disabled**: in-process cache
/// - **Redis enabled**: connects to Redis, falls back to in-process on failure
///
/// Sessions live in the cache, so with the in-process fallback they are not
/// shared between server instances and do not survive a restart.
pub async fn create_cache_backend(config: &RedisConfig) -> DynCache {
    if !config.enabled {
        tracing::info!("Redis disabled, using in-process cache");
        return folio_db_memory::create_cache();
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let cache = match RedisCache::from_config(config) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to in-process cache."
            );
            return folio_db_memory::create_cache();
        }
    };

    match cache.ping().await {
        Ok(()) => {
            tracing::info!("Connected to Redis");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to in-process cache."
            );
            folio_db_memory::create_cache()
        }
    }
}
