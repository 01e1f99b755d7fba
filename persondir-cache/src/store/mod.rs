//! Bundled [`CacheStore`](persondir_core::CacheStore) implementations.

mod memory;
mod ttl;

pub use memory::MemoryCacheStore;
pub use ttl::{StoreStats, TtlCacheStore};
