use serde::{Deserialize, Serialize};
use std::time::Duration;

/// In-memory TTL cache for extraction results
///
/// Extraction is a remote model call, so results are kept per extraction
/// text for `ttl_secs`. Entries are evicted LRU-style past `max_entries`.
#[derive(Clone)]
pub struct TokenCache {
    inner: moka::future::Cache<String, Vec<String>>,
    ttl_secs: u64,
}

impl TokenCache {
    /// Create a new token cache
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, ttl_secs }
    }

    /// Get cached tokens for a key
    pub async fn get(&self, key: &str) -> Option<Vec<String>> {
        let hit = self.inner.get(key).await;
        if hit.is_some() {
            tracing::trace!("Token cache hit: {}", key);
        } else {
            tracing::trace!("Token cache miss: {}", key);
        }
        hit
    }

    /// Store tokens under a key
    pub async fn set(&self, key: &str, tokens: Vec<String>) {
        self.inner.insert(key.to_string(), tokens).await;
        tracing::trace!("Token cache set: {}", key);
    }

    /// Drop a single entry
    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the tokens extracted from a text
    pub fn tokens(text: &str) -> String {
        format!("tokens:{}", text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_set_get() {
        let cache = TokenCache::new(100, 60);
        let key = CacheKey::tokens("COURSES: CSE 230");

        tokio_test::block_on(async {
            assert!(cache.get(&key).await.is_none());

            cache.set(&key, vec!["CSE".to_string()]).await;
            assert_eq!(cache.get(&key).await, Some(vec!["CSE".to_string()]));

            cache.delete(&key).await;
            assert!(cache.get(&key).await.is_none());
        });
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::tokens("  MAJOR: Biology "), "tokens:MAJOR: Biology");
    }

    #[test]
    fn test_stats_report_ttl() {
        let cache = TokenCache::new(10, 300);
        assert_eq!(cache.stats().ttl_secs, 300);
    }
}
