//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached payload together with its insertion time.
///
/// Expiry is absolute: an entry's lifetime is measured from insertion and is
/// never extended by reads. Recency for eviction purposes is tracked
/// separately by the owning store's LRU tracker.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// When the entry was inserted
    pub inserted_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry, stamping the insertion time.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived the given TTL.
    ///
    /// Boundary condition: an entry is expired once its age is greater than
    /// or equal to the TTL, so a probe landing exactly on the boundary
    /// already misses.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }

    // == Age ==
    /// Returns how long ago the entry was inserted.
    ///
    /// Useful for debugging and statistics purposes.
    #[allow(dead_code)]
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}
