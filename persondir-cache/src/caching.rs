//! Caching decorator over an attribute lookup.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use persondir_core::error::{PersonDirError, Result};
use persondir_core::traits::{AttributeLookup, CacheStore};
use persondir_core::types::{AttributeRecord, AttributeValue, Seed};

use crate::config::CachingConfig;
use crate::key::CacheKeyBuilder;
use crate::stats::LookupStats;

/// Attribute lookup that caches the results of a wrapped lookup.
///
/// Resolves a seed by:
/// 1. Deriving a cache key from the seed
/// 2. Returning the stored record on a hit
/// 3. Otherwise asking the wrapped lookup and storing its answer
///
/// No locking happens here. Two concurrent misses on the same key both
/// reach the wrapped lookup, and the store decides what thread safety it
/// offers.
pub struct CachingLookup<V: AttributeValue = String> {
    lookup: Arc<dyn AttributeLookup<V>>,
    store: Arc<dyn CacheStore<V>>,
    keys: CacheKeyBuilder,
    stats: LookupStats,
}

impl<V: AttributeValue> CachingLookup<V> {
    /// Starts building a caching lookup.
    pub fn builder() -> CachingLookupBuilder<V> {
        CachingLookupBuilder::new()
    }

    /// Creates a caching lookup from configuration, building its store.
    pub fn from_config(config: &CachingConfig, lookup: Arc<dyn AttributeLookup<V>>) -> Result<Self> {
        config.validate()?;
        let mut builder = Self::builder()
            .shared_lookup(lookup)
            .shared_store(config.build_store())
            .key_attributes(config.key_attributes.iter().cloned());
        if let Some(default) = &config.default_attribute {
            builder = builder.default_attribute(default.clone());
        }
        builder.build()
    }

    /// Returns the lookup counters.
    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    /// Returns the key derivation policy.
    pub fn key_builder(&self) -> &CacheKeyBuilder {
        &self.keys
    }

    /// Resolves a seed, answering from the cache when possible.
    ///
    /// Delegate failures propagate unchanged and leave the cache untouched.
    #[instrument(skip(self, seed), fields(seed_attributes = seed.len()))]
    pub async fn resolve(&self, seed: &Seed<V>) -> Result<AttributeRecord<V>> {
        let Some(key) = self.keys.derive_key(seed)? else {
            warn!(
                ?seed,
                key_attributes = ?self.keys.key_attributes(),
                default_attribute = ?self.keys.default_attribute(),
                "No cache key generated, caching disabled for this query"
            );
            self.stats.record_miss();
            self.log_stats();
            return self.lookup.resolve(seed).await;
        };

        if let Some(record) = self.store.get(&key) {
            debug!(?key, "Retrieved query from cache");
            self.stats.record_hit();
            self.log_stats();
            return Ok(record);
        }

        let record = self.lookup.resolve(seed).await?;
        self.store.put(key.clone(), record.clone());
        debug!(?key, "Retrieved query from wrapped lookup and stored in cache");

        self.stats.record_miss();
        self.log_stats();
        Ok(record)
    }

    /// Resolves the person whose default attribute equals `uid`.
    pub async fn resolve_uid(&self, uid: V) -> Result<AttributeRecord<V>> {
        let attribute = self.keys.default_attribute().ok_or_else(|| {
            PersonDirError::ConfigError("resolving by uid requires a default attribute".into())
        })?;

        self.resolve(&Seed::new().with(attribute, uid)).await
    }

    /// Lists the attribute names of the wrapped lookup. Never cached.
    pub async fn possible_attribute_names(&self) -> Result<BTreeSet<String>> {
        self.lookup.possible_attribute_names().await
    }

    fn log_stats(&self) {
        debug!(stats = %self.stats.snapshot(), "Cache stats");
    }
}

impl CachingLookup<String> {
    /// Resolves by a string uid, rejecting blank ones.
    pub async fn resolve_username(&self, uid: &str) -> Result<AttributeRecord<String>> {
        if uid.trim().is_empty() {
            return Err(PersonDirError::InvalidArgument("uid cannot be blank".into()));
        }
        self.resolve_uid(uid.to_string()).await
    }
}

#[async_trait]
impl<V: AttributeValue> AttributeLookup<V> for CachingLookup<V> {
    async fn resolve(&self, seed: &Seed<V>) -> Result<AttributeRecord<V>> {
        CachingLookup::resolve(self, seed).await
    }

    async fn possible_attribute_names(&self) -> Result<BTreeSet<String>> {
        CachingLookup::possible_attribute_names(self).await
    }
}

/// Builder for [`CachingLookup`].
///
/// The wrapped lookup and the store are required. The key policy is only
/// checked when a key is first derived.
pub struct CachingLookupBuilder<V: AttributeValue = String> {
    lookup: Option<Arc<dyn AttributeLookup<V>>>,
    store: Option<Arc<dyn CacheStore<V>>>,
    keys: CacheKeyBuilder,
}

impl<V: AttributeValue> CachingLookupBuilder<V> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            lookup: None,
            store: None,
            keys: CacheKeyBuilder::new(),
        }
    }

    /// Sets the lookup answering cache misses.
    pub fn lookup<L: AttributeLookup<V> + 'static>(self, lookup: L) -> Self {
        self.shared_lookup(Arc::new(lookup))
    }

    /// Sets a shared lookup answering cache misses.
    pub fn shared_lookup(mut self, lookup: Arc<dyn AttributeLookup<V>>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Sets the store holding cached records.
    pub fn store<S: CacheStore<V> + 'static>(self, store: S) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Sets a shared store holding cached records.
    pub fn shared_store(mut self, store: Arc<dyn CacheStore<V>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the seed attributes forming the cache key.
    pub fn key_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = self.keys.with_key_attributes(attributes);
        self
    }

    /// Sets the fallback key attribute.
    pub fn default_attribute(mut self, name: impl Into<String>) -> Self {
        self.keys = self.keys.with_default_attribute(name);
        self
    }

    /// Builds the caching lookup.
    pub fn build(self) -> Result<CachingLookup<V>> {
        let lookup = self.lookup.ok_or_else(|| {
            PersonDirError::ConfigError("no wrapped attribute lookup has been specified".into())
        })?;
        let store = self.store.ok_or_else(|| {
            PersonDirError::ConfigError("no cache store has been specified".into())
        })?;

        Ok(CachingLookup {
            lookup,
            store,
            keys: self.keys,
            stats: LookupStats::new(),
        })
    }
}

impl<V: AttributeValue> Default for CachingLookupBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
