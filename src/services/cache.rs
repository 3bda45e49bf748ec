//! In-memory TTL read-through cache keyed by resource path

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::clock::Clock;

pub const DEFAULT_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Entries expire lazily: staleness is only checked, and the entry only
/// evicted, when it is read. There is no size bound.
#[derive(Clone)]
pub struct EntityCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl EntityCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Fresh data for `key`; a stale entry is evicted and reported as a miss
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let fresh = entries
            .get(key)
            .map(|entry| now - entry.timestamp < self.ttl);

        match fresh {
            Some(true) => {
                tracing::debug!("Cache hit for {}", key);
                entries.get(key).map(|entry| entry.data.clone())
            }
            Some(false) => {
                tracing::debug!("Cache entry for {} expired", key);
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!("Cache miss for {}", key);
                None
            }
        }
    }

    /// Typed [`get`](Self::get). Data that no longer decodes as `T` counts as
    /// a miss and is evicted.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.get(key)?;
        match serde_json::from_value(data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Evicting undecodable cache entry {}: {}", key, e);
                self.remove(key);
                None
            }
        }
    }

    pub fn set_value(&self, key: &str, data: Value) {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now(),
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.set_value(key, value),
            Err(e) => tracing::warn!("Not caching {}: {}", key, e),
        }
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Remove every key starting with `prefix`, or everything when `None`
    pub fn invalidate(&self, prefix: Option<&str>) {
        let mut entries = self.entries.lock();
        match prefix {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => entries.clear(),
        }
    }

    /// Raw presence check, without TTL evaluation
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
