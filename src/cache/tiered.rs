//! Tiered Cache Module
//!
//! Three independent stores (search, template, categories) behind a single
//! get-or-compute entry point. Capacities derive from one budget; each store
//! keeps its own TTL and eviction order.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::cache::{
    Store, StoreStats, CATEGORIES_SHARE_PCT, CATEGORIES_SLOT, SEARCH_SHARE_PCT, TEMPLATE_SHARE_PCT,
};

// == Cache Kind ==
/// Identifies which of the three stores an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Search,
    Template,
    Categories,
}

impl CacheKind {
    /// Store name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Search => "search",
            CacheKind::Template => "template",
            CacheKind::Categories => "categories",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Config ==
/// Sizing and expiry settings, consumed once when the cache is built.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total entry budget split across the three stores
    pub max_size: usize,
    /// TTL for search result pages and node lookups
    pub search_ttl: Duration,
    /// TTL for individual templates
    pub template_ttl: Duration,
    /// TTL for the category listing
    pub categories_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            search_ttl: Duration::from_secs(900),
            template_ttl: Duration::from_secs(3600),
            categories_ttl: Duration::from_secs(86400),
        }
    }
}

// == Cache Error ==
/// Failure during a get-or-compute operation.
///
/// Wraps whatever went wrong underneath, whether the producer failed or the
/// cache itself could not encode or decode the slot; callers that care must
/// inspect the source.
#[derive(Debug, Error)]
#[error("cache operation failed for {kind} cache, key '{key}'")]
pub struct CacheError {
    pub kind: CacheKind,
    pub key: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl CacheError {
    fn new(
        kind: CacheKind,
        key: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

// == Cache Stats ==
/// Per-store snapshots for the whole tier.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub search: StoreStats,
    pub template: StoreStats,
    pub categories: StoreStats,
}

// == Tiered Cache ==
/// Three bounded LRU+TTL stores behind one get-or-compute entry point.
///
/// Each store is guarded individually, and no guard is ever held across a
/// producer await. Two tasks missing the same key therefore both run their
/// producers and the later write wins; with idempotent producers that is a
/// deliberate tradeoff, not a race to fix.
#[derive(Debug)]
pub struct TieredCache {
    search: RwLock<Store>,
    template: RwLock<Store>,
    categories: RwLock<Store>,
}

impl TieredCache {
    // == Constructor ==
    /// Builds the three stores from a shared budget: 50% search, 40%
    /// template, 10% categories, each floored.
    ///
    /// Small budgets can leave the categories store with zero capacity; it
    /// then simply never caches.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            search: RwLock::new(Store::new(
                partition(config.max_size, SEARCH_SHARE_PCT),
                config.search_ttl,
            )),
            template: RwLock::new(Store::new(
                partition(config.max_size, TEMPLATE_SHARE_PCT),
                config.template_ttl,
            )),
            categories: RwLock::new(Store::new(
                partition(config.max_size, CATEGORIES_SHARE_PCT),
                config.categories_ttl,
            )),
        }
    }

    // == Get Or Compute ==
    /// Returns the cached value for `kind`/`key`, or runs `producer` to fill
    /// the slot.
    ///
    /// The producer runs only on a miss, at most once per call, and its
    /// failure leaves the store untouched. The categories store keeps a
    /// single slot and ignores the key. Values round-trip through JSON, so
    /// any serde-capable type can be cached; re-reading a slot at an
    /// incompatible type surfaces as a [`CacheError`].
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        kind: CacheKind,
        key: &str,
        producer: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = slot_key(kind, key);
        let store = self.store(kind);

        if let Some(value) = store.write().await.get(&slot) {
            return serde_json::from_value(value).map_err(|e| CacheError::new(kind, &slot, e));
        }

        let produced = producer()
            .await
            .map_err(|e| CacheError::new(kind, &slot, e))?;
        let value =
            serde_json::to_value(&produced).map_err(|e| CacheError::new(kind, &slot, e))?;
        store.write().await.insert(slot, value);

        Ok(produced)
    }

    // == Clear ==
    /// Empties all three stores unconditionally.
    pub async fn clear(&self) {
        self.search.write().await.clear();
        self.template.write().await.clear();
        self.categories.write().await.clear();
    }

    // == Stats ==
    /// Snapshots every store without touching recency order.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            search: self.search.read().await.stats(),
            template: self.template.read().await.stats(),
            categories: self.categories.read().await.stats(),
        }
    }

    // == Evict Expired ==
    /// Sweeps expired entries out of every store, returning the total
    /// removed.
    ///
    /// Expiry on access stays the primary mechanism; the sweep reclaims
    /// memory held by stores nobody is reading.
    pub async fn evict_expired(&self) -> usize {
        self.search.write().await.evict_expired()
            + self.template.write().await.evict_expired()
            + self.categories.write().await.evict_expired()
    }

    fn store(&self, kind: CacheKind) -> &RwLock<Store> {
        match kind {
            CacheKind::Search => &self.search,
            CacheKind::Template => &self.template,
            CacheKind::Categories => &self.categories,
        }
    }
}

// == Helpers ==
/// Floored share of the entry budget for one store.
fn partition(budget: usize, share_pct: usize) -> usize {
    budget * share_pct / 100
}

/// The categories store keeps one fixed slot regardless of the caller's key.
fn slot_key(kind: CacheKind, key: &str) -> String {
    match kind {
        CacheKind::Categories => CATEGORIES_SLOT.to_string(),
        _ => key.to_string(),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::sleep;

    fn test_config() -> CacheConfig {
        CacheConfig::default()
    }

    fn io_error(message: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, message.to_string())
    }

    #[tokio::test]
    async fn test_partition_follows_shares_for_default_budget() {
        let cache = TieredCache::new(&test_config());
        let stats = cache.stats().await;

        assert_eq!(stats.search.max_size, 500);
        assert_eq!(stats.template.max_size, 400);
        assert_eq!(stats.categories.max_size, 100);
    }

    #[tokio::test]
    async fn test_partition_floors_small_budgets() {
        let config = CacheConfig {
            max_size: 7,
            ..test_config()
        };
        let cache = TieredCache::new(&config);
        let stats = cache.stats().await;

        assert_eq!(stats.search.max_size, 3);
        assert_eq!(stats.template.max_size, 2);
        assert_eq!(stats.categories.max_size, 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_invoke_producer_once() {
        let cache = TieredCache::new(&test_config());
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let value: String = cache
                .get_or_compute(CacheKind::Search, "slack", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, io::Error>("results".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "results");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_producer_error_leaves_store_empty() {
        let cache = TieredCache::new(&test_config());

        let result: Result<String, CacheError> = cache
            .get_or_compute(CacheKind::Template, "42", || async {
                Err::<String, _>(io_error("upstream down"))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, CacheKind::Template);
        assert_eq!(err.key, "42");
        assert_eq!(cache.stats().await.template.size, 0);

        // The slot is still computable once the producer recovers.
        let calls = AtomicU32::new(0);
        let value: String = cache
            .get_or_compute(CacheKind::Template, "42", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, io::Error>("recovered".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_categories_store_ignores_key() {
        let cache = TieredCache::new(&test_config());
        let calls = AtomicU32::new(0);

        let first: Vec<String> = cache
            .get_or_compute(CacheKind::Categories, "all", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, io::Error>(vec!["Marketing".to_string()])
            })
            .await
            .unwrap();

        // A different key lands in the same single slot.
        let second: Vec<String> = cache
            .get_or_compute(CacheKind::Categories, "anything-else", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, io::Error>(vec!["never produced".to_string()])
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(cache.stats().await.categories.size, 1);
    }

    #[tokio::test]
    async fn test_expired_slot_recomputes() {
        let config = CacheConfig {
            search_ttl: Duration::from_millis(50),
            ..test_config()
        };
        let cache = TieredCache::new(&config);
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let _: u32 = cache
                .get_or_compute(CacheKind::Search, "k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, io::Error>(7)
                })
                .await
                .unwrap();
            sleep(Duration::from_millis(80)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_zeroes_every_store() {
        let cache = TieredCache::new(&test_config());

        let _: u32 = cache
            .get_or_compute(CacheKind::Search, "a", || async { Ok::<_, io::Error>(1) })
            .await
            .unwrap();
        let _: u32 = cache
            .get_or_compute(CacheKind::Template, "b", || async { Ok::<_, io::Error>(2) })
            .await
            .unwrap();
        let _: u32 = cache
            .get_or_compute(CacheKind::Categories, "c", || async { Ok::<_, io::Error>(3) })
            .await
            .unwrap();

        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.search.size, 0);
        assert_eq!(stats.template.size, 0);
        assert_eq!(stats.categories.size, 0);
    }

    #[tokio::test]
    async fn test_search_store_holds_heterogeneous_values() {
        let cache = TieredCache::new(&test_config());

        let page: Vec<String> = cache
            .get_or_compute(CacheKind::Search, "{\"query\":\"email\"}", || async {
                Ok::<_, io::Error>(vec!["tpl-1".to_string()])
            })
            .await
            .unwrap();
        let count: u64 = cache
            .get_or_compute(CacheKind::Search, "node:slack", || async {
                Ok::<_, io::Error>(12u64)
            })
            .await
            .unwrap();

        assert_eq!(page, vec!["tpl-1".to_string()]);
        assert_eq!(count, 12);
        assert_eq!(cache.stats().await.search.size, 2);
    }

    #[tokio::test]
    async fn test_incompatible_type_on_hit_is_cache_error() {
        let cache = TieredCache::new(&test_config());

        let _: String = cache
            .get_or_compute(CacheKind::Search, "k", || async {
                Ok::<_, io::Error>("text".to_string())
            })
            .await
            .unwrap();

        let result: Result<u32, CacheError> = cache
            .get_or_compute(CacheKind::Search, "k", || async {
                Ok::<_, io::Error>(3u32)
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_evict_expired_counts_across_stores() {
        let config = CacheConfig {
            search_ttl: Duration::from_millis(40),
            template_ttl: Duration::from_millis(40),
            ..test_config()
        };
        let cache = TieredCache::new(&config);

        let _: u32 = cache
            .get_or_compute(CacheKind::Search, "a", || async { Ok::<_, io::Error>(1) })
            .await
            .unwrap();
        let _: u32 = cache
            .get_or_compute(CacheKind::Template, "b", || async { Ok::<_, io::Error>(2) })
            .await
            .unwrap();

        sleep(Duration::from_millis(70)).await;

        assert_eq!(cache.evict_expired().await, 2);
        let stats = cache.stats().await;
        assert_eq!(stats.search.size, 0);
        assert_eq!(stats.template.size, 0);
    }
}
