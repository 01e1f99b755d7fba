//! # persondir Cache
//!
//! Caching decorator for attribute lookup services.
//!
//! [`CachingLookup`] wraps any [`AttributeLookup`](persondir_core::AttributeLookup)
//! and a [`CacheStore`](persondir_core::CacheStore). Results are keyed on a
//! configurable subset of seed attributes, built by [`CacheKeyBuilder`].
//!
//! Two stores are bundled:
//!
//! - **Memory**: unbounded concurrent map
//! - **TTL**: capacity- and age-bounded map
//!
//! ## Example
//!
//! ```rust,ignore
//! use persondir_cache::{CachingLookup, MemoryCacheStore};
//!
//! let lookup = CachingLookup::builder()
//!     .lookup(directory)
//!     .store(MemoryCacheStore::new())
//!     .key_attributes(["uid"])
//!     .build()?;
//!
//! let record = lookup.resolve(&seed).await?;
//! println!("{}", lookup.stats().snapshot());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod caching;
mod config;
mod key;
mod stats;
mod store;

pub use caching::{CachingLookup, CachingLookupBuilder};
pub use config::{CachingConfig, StoreConfig, StoreKind};
pub use key::CacheKeyBuilder;
pub use stats::{LookupStats, StatsSnapshot};
pub use store::{MemoryCacheStore, StoreStats, TtlCacheStore};
