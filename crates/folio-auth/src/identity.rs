//! Cached identity of logged-in users.
//!
//! The authentication extractor treats the presence of this record as "the
//! user is logged in". Clearing it signs the user out of every session at once.

use std::time::Duration;

use folio_storage::{CacheResult, DynCache, User};
use uuid::Uuid;

use crate::keys;

#[derive(Clone)]
pub struct IdentityCache {
    cache: DynCache,
    ttl: Duration,
}

impl IdentityCache {
    pub fn new(cache: DynCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Stores `user`. The password hash is never serialized.
    pub async fn put(&self, user: &User) -> CacheResult<()> {
        let payload = serde_json::to_string(user)?;
        self.cache
            .set(&keys::user_auth(user.id), &payload, Some(self.ttl))
            .await
    }

    /// Returns the cached identity. An undecodable record counts as absent.
    pub async fn get(&self, user_id: Uuid) -> CacheResult<Option<User>> {
        let Some(raw) = self.cache.get(&keys::user_auth(user_id)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "discarding undecodable cached identity");
                Ok(None)
            }
        }
    }

    /// Forces a global logout of `user_id`.
    pub async fn clear(&self, user_id: Uuid) -> CacheResult<()> {
        self.cache.del(&keys::user_auth(user_id)).await
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
