//! Query and miss accounting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters owned by one caching lookup.
///
/// `queries` and `misses` are updated independently; a concurrent reader
/// may briefly observe one ahead of the other. Hits are never stored,
/// only derived.
#[derive(Debug, Default)]
pub struct LookupStats {
    queries: AtomicU64,
    misses: AtomicU64,
}

impl LookupStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Total resolve calls that got past key derivation.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Calls answered by the wrapped lookup.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Calls answered from the cache.
    pub fn hits(&self) -> u64 {
        self.queries().saturating_sub(self.misses())
    }

    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let queries = self.queries();
        let misses = self.misses();
        let hits = queries.saturating_sub(misses);

        StatsSnapshot {
            queries,
            hits,
            misses,
            hit_rate: if queries > 0 {
                hits as f64 / queries as f64
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time lookup statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total queries
    pub queries: u64,
    /// Queries answered from the cache
    pub hits: u64,
    /// Queries answered by the wrapped lookup
    pub misses: u64,
    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={}, hits={}, misses={}",
            self.queries, self.hits, self.misses
        )
    }
}
