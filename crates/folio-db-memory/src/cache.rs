//! Single-instance cache backed by `DashMap`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use folio_storage::{CacheResult, CacheStore};

#[derive(Clone, Debug)]
enum CachedValue {
    String(String),
    Hash(HashMap<String, String>),
}

/// A cached entry with an optional deadline.
#[derive(Clone, Debug)]
struct CachedEntry {
    value: CachedValue,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-process implementation of [`CacheStore`].
///
/// Expired entries are dropped lazily on access. Type mismatches (a string
/// command against a hash key or the reverse) behave as a miss instead of an
/// error.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CachedEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` holds a live value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.live(key).is_some()
    }

    fn live(&self, key: &str) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired());
            return None;
        }
        Some(entry.value.clone())
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(match self.live(key) {
            Some(CachedValue::String(value)) => Some(value),
            _ => None,
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            CachedEntry {
                value: CachedValue::String(value.to_string()),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        Ok(match self.live(key) {
            Some(CachedValue::Hash(map)) => map.get(field).cloned(),
            _ => None,
        })
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CachedEntry {
                value: CachedValue::Hash(HashMap::new()),
                expires_at: None,
            });
        if entry.is_expired() || !matches!(entry.value, CachedValue::Hash(_)) {
            *entry = CachedEntry {
                value: CachedValue::Hash(HashMap::new()),
                expires_at: None,
            };
        }
        if let CachedValue::Hash(map) = &mut entry.value {
            map.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> CacheResult<()> {
        let now_empty = match self.entries.get_mut(key) {
            Some(mut entry) => match &mut entry.value {
                CachedValue::Hash(map) => {
                    map.remove(field);
                    map.is_empty()
                }
                CachedValue::String(_) => false,
            },
            None => false,
        };
        if now_empty {
            self.entries.remove(key);
        }
        Ok(())
    }

    /// Sets a new deadline on a live key. An expired key stays gone.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let expired = match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                false
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, e| e.is_expired());
        }
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}
