//! In-memory storage and cache backends for the folio server.
//!
//! [`InMemoryStorage`] implements every storage trait from `folio-storage`;
//! [`InMemoryCache`] implements [`CacheStore`](folio_storage::CacheStore).
//! Both are used by the test suites and by single-node deployments that run
//! without PostgreSQL or Redis.
//!
//! # Example
//!
//! ```ignore
//! use folio_db_memory::InMemoryStorage;
//! use folio_storage::UserStorage;
//!
//! let storage = InMemoryStorage::new();
//! let user = storage.find_user_by_email("a@b.com").await?;
//! ```

mod cache;
mod storage;

use std::sync::Arc;

use folio_storage::{DynCache, DynStorage};

pub use cache::InMemoryCache;
pub use storage::InMemoryStorage;

/// Creates a new shareable in-memory storage instance.
pub fn create_storage() -> DynStorage {
    Arc::new(InMemoryStorage::new())
}

/// Creates a new shareable in-memory cache instance.
pub fn create_cache() -> DynCache {
    Arc::new(InMemoryCache::new())
}
