//! Store Module
//!
//! One bounded store combining HashMap storage with LRU tracking and TTL
//! expiration. The tiered cache owns three of these, sized from a shared
//! budget.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{CacheEntry, LruTracker, StoreStats};

// == Store ==
/// Bounded key-value store over JSON payloads with LRU eviction and a fixed
/// TTL measured from insertion.
#[derive(Debug)]
pub struct Store {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance counters
    stats: StoreStats,
    /// Maximum number of entries; zero means the store never caches
    capacity: usize,
    /// How long entries stay valid
    ttl: Duration,
}

impl Store {
    // == Constructor ==
    /// Creates a store with the given capacity and TTL.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the store can hold
    /// * `ttl` - Lifetime of every entry, measured from insertion
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: StoreStats::new(capacity),
            capacity,
            ttl,
        }
    }

    // == Get ==
    /// Looks up a key, returning the stored payload on a live hit.
    ///
    /// A hit refreshes the entry's recency but not its TTL clock. An expired
    /// entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(self.ttl) {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_miss();
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            self.lru.touch(key);
            Some(value)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Insert ==
    /// Stores a payload under a key, overwriting any previous entry.
    ///
    /// Overwriting restarts the TTL clock. Inserting a new key at capacity
    /// evicts the least recently used entry first. A zero-capacity store
    /// drops the payload silently.
    pub fn insert(&mut self, key: String, value: Value) {
        if self.capacity == 0 {
            return;
        }

        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.capacity {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);
    }

    // == Clear ==
    /// Removes every entry. Lifetime counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Evict Expired ==
    /// Sweeps out all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        count
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters and occupancy.
    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
