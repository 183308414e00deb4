//! Per-user session store.
//!
//! Sessions of one user live in a single cache hash keyed by
//! [`keys::user_sessions`]; each field maps a session id to its refresh token.
//! The whole hash shares one expiry which is reset on every login.

use std::time::Duration;

use folio_storage::{CacheResult, DynCache};
use uuid::Uuid;

use crate::keys;

#[derive(Clone)]
pub struct SessionStore {
    cache: DynCache,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: DynCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Inserts or overwrites one session and resets the collection expiry.
    pub async fn put(&self, user_id: Uuid, session_id: Uuid, token: &str) -> CacheResult<()> {
        let key = keys::user_sessions(user_id);
        self.cache
            .hset(&key, &session_id.to_string(), token)
            .await?;
        self.cache.expire(&key, self.ttl).await
    }

    /// Returns the refresh token of the session, or `None` if it was never
    /// created, has expired or was revoked.
    pub async fn get(&self, user_id: Uuid, session_id: Uuid) -> CacheResult<Option<String>> {
        self.cache
            .hget(&keys::user_sessions(user_id), &session_id.to_string())
            .await
    }

    /// Removes one session. Sibling sessions of the same user are untouched.
    pub async fn delete(&self, user_id: Uuid, session_id: Uuid) -> CacheResult<()> {
        self.cache
            .hdel(&keys::user_sessions(user_id), &session_id.to_string())
            .await
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
