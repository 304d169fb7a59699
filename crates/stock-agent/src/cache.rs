//! TTL caches in front of the market data providers
//!
//! Each cache is bounded: expired entries are flushed on insert and the least
//! recently used entry is evicted once the capacity is reached.

use cached::{Cached, TimedSizedCache};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::StockConfig;

/// Cache key for market data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Upper-cased ticker
    pub symbol: String,
    /// Operation, e.g. `quote` or `history`
    pub endpoint: &'static str,
    /// Extra discriminator such as the history period
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: &str, endpoint: &'static str, params: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            endpoint,
            params: params.into(),
        }
    }
}

/// Thread-safe TTL cache; clones share storage
#[derive(Clone)]
pub struct StockCache {
    cache: Arc<RwLock<TimedSizedCache<CacheKey, Value>>>,
}

impl StockCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedSizedCache::with_size_and_lifespan(
                capacity.max(1),
                ttl,
            ))),
        }
    }

    /// Get a live value
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        // cache_get evicts expired entries, so it needs the write lock
        self.cache.write().await.cache_get(key).cloned()
    }

    /// Insert a value, dropping expired entries first
    pub async fn insert(&self, key: CacheKey, value: Value) {
        let mut cache = self.cache.write().await;
        cache.flush();
        cache.cache_set(key, value);
    }

    /// Return the cached value or run `fetcher` and cache its success
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(symbol = %key.symbol, endpoint = key.endpoint, "Cache hit");
            return Ok(value);
        }

        debug!(symbol = %key.symbol, endpoint = key.endpoint, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        self.cache.write().await.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// One cache per data kind, each with its own TTL
#[derive(Clone)]
pub struct MarketCache {
    /// Quotes
    pub realtime: StockCache,
    /// Company profiles
    pub fundamental: StockCache,
    /// Price history
    pub history: StockCache,
}

impl MarketCache {
    /// Create caches with the TTLs from `config`
    pub fn new(config: &StockConfig) -> Self {
        Self {
            realtime: StockCache::new(config.cache_ttl_realtime, config.cache_capacity),
            fundamental: StockCache::new(config.cache_ttl_fundamental, config.cache_capacity),
            history: StockCache::new(config.cache_ttl_history, config.cache_capacity),
        }
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.realtime.clear().await;
        self.fundamental.clear().await;
        self.history.clear().await;
    }
}
