//! Unbounded in-memory cache store.

use dashmap::DashMap;

use persondir_core::traits::CacheStore;
use persondir_core::types::{AttributeRecord, AttributeValue, CacheKey};

/// Unbounded concurrent cache store.
///
/// Never evicts; entries live until removed or cleared.
#[derive(Debug)]
pub struct MemoryCacheStore<V: AttributeValue = String> {
    entries: DashMap<CacheKey<V>, AttributeRecord<V>>,
}

impl<V: AttributeValue> MemoryCacheStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Creates a store with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }

    /// Removes an entry.
    pub fn remove(&self, key: &CacheKey<V>) -> Option<AttributeRecord<V>> {
        self.entries.remove(key).map(|(_, record)| record)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: AttributeValue> Default for MemoryCacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: AttributeValue> CacheStore<V> for MemoryCacheStore<V> {
    fn get(&self, key: &CacheKey<V>) -> Option<AttributeRecord<V>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: CacheKey<V>, record: AttributeRecord<V>) {
        self.entries.insert(key, record);
    }
}
