//! Store Statistics Module
//!
//! Tracks per-store performance counters: hits, misses, and evictions.

use serde::Serialize;

// == Store Stats ==
/// Counters and occupancy for one store.
///
/// `size` is filled in when a snapshot is taken; the counters accumulate for
/// the lifetime of the store and survive `clear`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Current number of entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Successful retrievals
    pub hits: u64,
    /// Failed retrievals (absent or expired)
    pub misses: u64,
    /// Entries pushed out by the LRU policy
    pub evictions: u64,
}

impl StoreStats {
    // == Constructor ==
    /// Creates counters at zero for a store of the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            size: 0,
            max_size,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    // == Hit Rate ==
    /// Hits over total lookups, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Occupancy ==
    /// Sets the occupied-entry count for a snapshot.
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }
}
