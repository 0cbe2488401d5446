//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, split
//! into three stores sized from a single entry budget.

mod entry;
mod lru;
mod stats;
mod store;
mod tiered;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::StoreStats;
pub use store::Store;
pub use tiered::{CacheConfig, CacheError, CacheKind, CacheStats, TieredCache};

// == Public Constants ==
/// Share of the entry budget given to the search store, in percent
pub const SEARCH_SHARE_PCT: usize = 50;

/// Share of the entry budget given to the template store, in percent
pub const TEMPLATE_SHARE_PCT: usize = 40;

/// Share of the entry budget given to the categories store, in percent
pub const CATEGORIES_SHARE_PCT: usize = 10;

/// Fixed slot key for the single-entry categories store
pub const CATEGORIES_SLOT: &str = "categories";
