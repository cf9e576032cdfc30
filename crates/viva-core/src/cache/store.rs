//! Backing store abstraction and the in-memory TTL map

use super::CacheError;
use glob::Pattern;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

/// String-keyed store holding JSON snapshots with externally owned TTLs
pub trait KeyValueStore: Send + Sync {
    /// Fetch a live value. Expired entries are absent.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a TTL
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key. Removing an absent key is fine.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List live keys matching a glob pattern
    fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Add one to an integer value, creating it at 1 with no expiry
    fn increment(&self, key: &str) -> Result<i64, CacheError>;

    /// Reset a key's TTL; false when the key is absent
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Whether a live value exists
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Clone)]
struct StoreEntry {
    value: String,
    /// None means the entry never expires (counters created by increment)
    expires_at: Option<SystemTime>,
}

impl StoreEntry {
    fn is_live(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Some(at) => now < at,
            None => true,
        }
    }
}

/// Entry counts; expired entries linger until [`MemoryStore::cleanup`] runs
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}

/// In-memory TTL map, the in-tree [`KeyValueStore`] implementation
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear expired entries
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.write() {
            let now = SystemTime::now();
            entries.retain(|_, entry| entry.is_live(now));
        }
    }

    /// Cache statistics
    pub fn stats(&self) -> StoreStats {
        let now = SystemTime::now();
        match self.entries.read() {
            Ok(entries) => StoreStats {
                total_entries: entries.len(),
                expired_entries: entries.values().filter(|e| !e.is_live(now)).count(),
            },
            Err(_) => StoreStats {
                total_entries: 0,
                expired_entries: 0,
            },
        }
    }

    fn read_entries(&self) -> Result<RwLockReadGuard<'_, HashMap<String, StoreEntry>>, CacheError> {
        self.entries
            .read()
            .map_err(|_| CacheError::Backend("store lock poisoned".to_string()))
    }

    fn write_entries(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, StoreEntry>>, CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::Backend("store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(SystemTime::now()))
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = StoreEntry {
            value,
            expires_at: Some(SystemTime::now() + ttl),
        };
        self.write_entries()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.write_entries()?.remove(key);
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let pattern = Pattern::new(pattern)?;
        let entries = self.read_entries()?;
        let now = SystemTime::now();
        Ok(entries
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && pattern.matches(key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let mut entries = self.write_entries()?;
        let now = SystemTime::now();

        match entries.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(entry) => {
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| CacheError::Backend(format!("{} is not an integer", key)))?;
                entry.value = (current + 1).to_string();
                Ok(current + 1)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    StoreEntry {
                        value: "1".to_string(),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut entries = self.write_entries()?;
        let now = SystemTime::now();

        match entries.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
