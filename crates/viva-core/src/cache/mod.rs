//! Cache-aside layer
//!
//! [`CacheService`] wraps an injected [`KeyValueStore`] and keeps caching a
//! pure optimization: every store-level failure is logged and recovered by
//! treating the operation as a miss, so a broken store can slow the system
//! down but never break it. A static type marker keeps persistence-layer
//! entities out of the store entirely.

pub mod keys;
pub mod store;

pub use store::{KeyValueStore, MemoryStore, StoreStats};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::Result;
use crate::eval::{CombinedResult, Question};

/// Store-level failures. Always recovered inside this module; callers of
/// [`CacheService`] never see one.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("invalid key pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Marker for types that may pass through the cache.
///
/// `PERSISTENT_ENTITY` stays `false` for plain value objects. Types
/// mirroring persistence-layer rows set it `true`: their lazy relational
/// references cannot be rehydrated outside the owning transaction, so the
/// adapter returns them to callers but never writes them to the store.
pub trait CacheValue: Serialize + DeserializeOwned {
    const PERSISTENT_ENTITY: bool = false;
}

impl CacheValue for CombinedResult {}
impl CacheValue for Vec<Question> {}

/// Cache-aside adapter over an injected store
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
}

impl CacheService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// In-memory service, used when no external store is wired in
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Look up `key`, or run `compute` and store its result under `ttl`.
    ///
    /// Corrupt or unreadable entries count as misses. Compute errors
    /// propagate; store errors never do.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.lookup::<T>(key) {
            Ok(Some(value)) => {
                debug!("Cache hit: {}", key);
                return Ok(value);
            }
            Ok(None) => debug!("Cache miss: {}", key),
            Err(e) => warn!("Cache lookup failed for {}: {}", key, e),
        }

        let value = compute().await?;

        if T::PERSISTENT_ENTITY {
            debug!("Not caching persistence entity at {}", key);
        } else if let Err(e) = self.write(key, &value, ttl) {
            warn!("Cache write failed for {}: {}", key, e);
        }

        Ok(value)
    }

    /// Store a value with TTL. Persistence entities are silently skipped.
    pub fn put<T: CacheValue>(&self, key: &str, value: &T, ttl: Duration) {
        if T::PERSISTENT_ENTITY {
            debug!("Not caching persistence entity at {}", key);
            return;
        }
        if let Err(e) = self.write(key, value, ttl) {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }

    /// Fetch a cached value; None on miss, expiry, corruption or store failure
    pub fn get<T: CacheValue>(&self, key: &str) -> Option<T> {
        match self.lookup(key) {
            Ok(found) => found,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Whether a live entry exists
    pub fn exists(&self, key: &str) -> bool {
        match self.store.exists(key) {
            Ok(found) => found,
            Err(e) => {
                warn!("Cache exists check failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Remove one key
    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            warn!("Cache invalidation failed for {}: {}", key, e);
        }
    }

    /// Remove every key matching a glob pattern
    pub fn invalidate_pattern(&self, pattern: &str) {
        let matched = match self.store.keys(pattern) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Cache pattern lookup failed for {}: {}", pattern, e);
                return;
            }
        };
        for key in matched {
            if let Err(e) = self.store.delete(&key) {
                warn!("Cache invalidation failed for {}: {}", key, e);
            }
        }
    }

    /// Add one to a counter; None when the store refuses
    pub fn increment(&self, key: &str) -> Option<i64> {
        match self.store.increment(key) {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("Cache increment failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Refresh a key's TTL; false when the key is absent or the store fails
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        match self.store.expire(key, ttl) {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Cache expire failed for {}: {}", key, e);
                false
            }
        }
    }

    fn lookup<T: CacheValue>(&self, key: &str) -> std::result::Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write<T: CacheValue>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json, ttl)
    }
}
