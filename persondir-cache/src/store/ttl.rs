//! Capacity- and age-bounded cache store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use persondir_core::traits::CacheStore;
use persondir_core::types::{AttributeRecord, AttributeValue, CacheKey};

use crate::config::StoreConfig;

/// Upper bound on the slots reserved up front, whatever the capacity.
const MAX_PREALLOCATED_ENTRIES: usize = 1024;

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry<V> {
    record: AttributeRecord<V>,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Cache store with TTL-based expiration and a size cap.
///
/// Expired entries read as absent. When full, expired entries are dropped
/// first (if `auto_cleanup` is set), then the oldest insert is evicted.
/// A store with zero capacity holds nothing.
pub struct TtlCacheStore<V: AttributeValue = String> {
    entries: RwLock<HashMap<CacheKey<V>, CacheEntry<V>>>,
    config: StoreConfig,
}

impl<V: AttributeValue> TtlCacheStore<V> {
    /// Creates a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(
                config.max_entries.min(MAX_PREALLOCATED_ENTRIES),
            )),
            config,
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Caches a record with a custom TTL.
    pub fn put_with_ttl(&self, key: CacheKey<V>, record: AttributeRecord<V>, ttl: Duration) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.write();

        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            if self.config.auto_cleanup {
                entries.retain(|_, entry| !entry.is_expired());
            }

            // Still at capacity? Remove oldest entry
            if entries.len() >= self.config.max_entries {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                record,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes an entry.
    pub fn remove(&self, key: &CacheKey<V>) {
        self.entries.write().remove(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, entry| !entry.is_expired());
    }

    /// Returns the number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();

        StoreStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl<V: AttributeValue> Default for TtlCacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: AttributeValue> CacheStore<V> for TtlCacheStore<V> {
    fn get(&self, key: &CacheKey<V>) -> Option<AttributeRecord<V>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.record.clone())
    }

    fn put(&self, key: CacheKey<V>, record: AttributeRecord<V>) {
        self.put_with_ttl(key, record, self.config.default_ttl());
    }
}

/// Store statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}
