use std::time::Duration;

use async_trait::async_trait;

use super::{CacheEntry, CacheQuery, CacheStats, DurableStats, LookupCache};

/// A cache that stores nothing. Every read misses and every write is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl LookupCache for DisabledCache {
    async fn get(&self, _query: &CacheQuery<'_>) -> Option<serde_json::Value> {
        None
    }

    async fn set(
        &self,
        _query: &CacheQuery<'_>,
        _payload: serde_json::Value,
        _ttl: Option<Duration>,
    ) {
    }

    async fn delete(&self, _query: &CacheQuery<'_>) {}

    async fn clear(&self) {}

    async fn stats(&self) -> CacheStats {
        CacheStats {
            durable: DurableStats {
                backend: "disabled".to_string(),
                ..DurableStats::default()
            },
            ..CacheStats::default()
        }
    }

    async fn sweep(&self) -> usize {
        0
    }

    async fn export(&self) -> Vec<CacheEntry> {
        Vec::new()
    }

    async fn import(&self, _entries: Vec<CacheEntry>) -> usize {
        0
    }
}
