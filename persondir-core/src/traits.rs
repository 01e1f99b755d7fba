//! Common traits for persondir.
//!
//! These traits define the seams between the caching decorator and the
//! services it wraps, enabling modularity and testing.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AttributeRecord, AttributeValue, CacheKey, Seed};

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for resolving a seed to a full attribute record.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - LDAP or SQL directories (for production)
/// - Another lookup wrapped in a decorator
#[async_trait]
pub trait AttributeLookup<V: AttributeValue>: Send + Sync {
    /// Resolves the attributes of the person identified by `seed`.
    ///
    /// A seed that matches nobody yields an empty record, not an error.
    async fn resolve(&self, seed: &Seed<V>) -> Result<AttributeRecord<V>>;

    /// Returns every attribute name this service can produce.
    async fn possible_attribute_names(&self) -> Result<BTreeSet<String>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for the key-value container that holds cached records.
///
/// The store owns its consistency, eviction and expiration policy.
/// Callers only ever read and write.
pub trait CacheStore<V: AttributeValue>: Send + Sync {
    /// Returns the record stored under `key`, if any.
    fn get(&self, key: &CacheKey<V>) -> Option<AttributeRecord<V>>;

    /// Stores `record` under `key`, replacing any previous value.
    fn put(&self, key: CacheKey<V>, record: AttributeRecord<V>);
}
