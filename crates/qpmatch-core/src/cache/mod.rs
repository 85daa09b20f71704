//! Lookup cache: two tiers with time-to-live expiry.
//!
//! Every lookup is keyed by a SHA-256 digest of `(phrase, language, limit,
//! kind filter)`. Reads go memory tier → durable tier. Writes land in memory
//! first, then go to the durable tier. The
//! durable tier is chosen once, at construction, through [`open_cache`]:
//!
//! | [`CacheBackend`] | Durable tier                                        |
//! |------------------|-----------------------------------------------------|
//! | `File`           | one JSON record per key in a directory              |
//! | `Structured`     | one SQLite table holding the same record schema     |
//! | `Disabled`       | none: every read misses, every write is dropped     |
//!
//! Callers only ever see the [`LookupCache`] trait. Durable-tier failures are
//! logged and swallowed: a failed read is a miss and a failed write is a no-op.

mod disabled;
mod file;
mod memory;
mod structured;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CacheError;
use crate::types::KindFilter;

pub use disabled::DisabledCache;
pub use file::FileStore;
pub use memory::MemoryTier;
pub use structured::StructuredStore;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

// ---------------------------------------------------------------------------
// Keys and records
// ---------------------------------------------------------------------------

/// The parameters a cached lookup is identified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheQuery<'a> {
    pub query: &'a str,
    pub language: &'a str,
    pub limit: usize,
    pub kind: KindFilter,
}

impl CacheQuery<'_> {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.query, self.language, self.limit, self.kind)
    }
}

/// Lowercase hex SHA-256 over the length-prefixed query, language, limit and
/// kind. Safe to use as a file name or a primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(query: &str, language: &str, limit: usize, kind: KindFilter) -> Self {
        let limit = limit.to_string();
        let mut hasher = Sha256::new();
        for field in [query, language, limit.as_str(), kind.as_str()] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        CacheKey(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a string read back from a durable tier.
    pub(crate) fn from_stored(raw: impl Into<String>) -> Self {
        CacheKey(raw.into())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cached lookup, as stored in either tier.
///
/// Entries are replaced wholesale on update; nothing mutates `payload` after
/// insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: serde_json::Value,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub ttl_millis: u64,
    pub original_query: String,
    pub language: String,
    pub limit: usize,
    pub kind_filter: KindFilter,
}

impl CacheEntry {
    pub fn new(query: &CacheQuery<'_>, payload: serde_json::Value, ttl: Duration) -> Self {
        Self {
            key: query.key(),
            payload,
            created_at: now_millis(),
            ttl_millis: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            original_query: query.query.to_string(),
            language: query.language.to_string(),
            limit: query.limit,
            kind_filter: query.kind,
        }
    }

    /// Valid iff `now - created_at < ttl`.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        let age = now_ms.saturating_sub(self.created_at);
        age < 0 || (age as u64) < self.ttl_millis
    }

    pub fn age_at(&self, now_ms: i64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.created_at).max(0) as u64)
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory: MemoryStats,
    pub durable: DurableStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub entries: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DurableStats {
    pub backend: String,
    pub entries: usize,
    pub total_bytes: u64,
    pub oldest: Option<EntryAge>,
    pub newest: Option<EntryAge>,
}

/// Identifies a durable entry (by original query or key) and how old it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryAge {
    pub name: String,
    pub age_ms: u64,
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

/// The cache as seen by the lookup client. Never fails: durable-tier errors
/// degrade to a miss on read and a no-op on write.
#[async_trait]
pub trait LookupCache: Send + Sync {
    async fn get(&self, query: &CacheQuery<'_>) -> Option<serde_json::Value>;

    /// Store `payload`, replacing any previous entry. `ttl = None` uses the
    /// cache's default TTL.
    async fn set(&self, query: &CacheQuery<'_>, payload: serde_json::Value, ttl: Option<Duration>);

    async fn delete(&self, query: &CacheQuery<'_>);

    async fn clear(&self);

    async fn stats(&self) -> CacheStats;

    /// Drop expired entries from both tiers and corrupted records from the
    /// durable tier. Returns how many distinct entries were removed.
    async fn sweep(&self) -> usize;

    /// Every valid durable record, oldest first.
    async fn export(&self) -> Vec<CacheEntry>;

    /// Replay `entries` through [`LookupCache::set`] with their own TTLs.
    /// Returns how many were stored.
    async fn import(&self, entries: Vec<CacheEntry>) -> usize;
}

/// A durable tier behind [`TieredCache`].
#[async_trait]
pub trait DurableStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    async fn remove(&self, key: &CacheKey) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    async fn stats(&self) -> Result<DurableStats, CacheError>;

    /// Remove records that are expired at `now_ms` or cannot be decoded.
    /// Returns the keys removed.
    async fn sweep(&self, now_ms: i64) -> Result<Vec<CacheKey>, CacheError>;

    /// Records still valid at `now_ms`, oldest first. Undecodable records are
    /// skipped.
    async fn export(&self, now_ms: i64) -> Result<Vec<CacheEntry>, CacheError>;
}

// ---------------------------------------------------------------------------
// Tiered cache
// ---------------------------------------------------------------------------

/// Memory tier in front of a [`DurableStore`].
pub struct TieredCache {
    memory: MemoryTier,
    durable: Box<dyn DurableStore>,
    default_ttl: Duration,
}

impl TieredCache {
    pub fn new(
        durable: Box<dyn DurableStore>,
        memory_capacity: usize,
        default_ttl: Duration,
    ) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            durable,
            default_ttl,
        }
    }
}

#[async_trait]
impl LookupCache for TieredCache {
    async fn get(&self, query: &CacheQuery<'_>) -> Option<serde_json::Value> {
        let key = query.key();
        let now = now_millis();

        if let Some(entry) = self.memory.get(&key, now) {
            tracing::debug!(query = query.query, "cache hit (memory)");
            return Some(entry.payload.clone());
        }

        match self.durable.load(&key).await {
            Ok(Some(entry)) if entry.is_valid_at(now) => {
                tracing::debug!(query = query.query, "cache hit ({})", self.durable.backend_name());
                let payload = entry.payload.clone();
                self.memory.insert(entry);
                Some(payload)
            }
            Ok(Some(_expired)) => {
                if let Err(e) = self.durable.remove(&key).await {
                    tracing::warn!(%key, "failed to remove expired cache record: {e}");
                }
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%key, "cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    async fn set(&self, query: &CacheQuery<'_>, payload: serde_json::Value, ttl: Option<Duration>) {
        let entry = Arc::new(CacheEntry::new(query, payload, ttl.unwrap_or(self.default_ttl)));
        self.memory.insert(Arc::clone(&entry));
        if let Err(e) = self.durable.save(&entry).await {
            tracing::warn!(key = %entry.key, "cache write failed: {e}");
        }
    }

    async fn delete(&self, query: &CacheQuery<'_>) {
        let key = query.key();
        self.memory.remove(&key);
        if let Err(e) = self.durable.remove(&key).await {
            tracing::warn!(%key, "cache delete failed: {e}");
        }
    }

    async fn clear(&self) {
        self.memory.clear();
        if let Err(e) = self.durable.clear().await {
            tracing::warn!("cache clear failed: {e}");
        }
    }

    async fn stats(&self) -> CacheStats {
        let durable = match self.durable.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("could not read cache stats: {e}");
                DurableStats {
                    backend: self.durable.backend_name().to_string(),
                    ..DurableStats::default()
                }
            }
        };
        CacheStats {
            memory: MemoryStats {
                entries: self.memory.len(),
                capacity: self.memory.capacity(),
            },
            durable,
        }
    }

    async fn sweep(&self) -> usize {
        let now = now_millis();
        // A key expired in both tiers counts once.
        let mut removed: HashSet<CacheKey> = self.memory.sweep(now).into_iter().collect();
        match self.durable.sweep(now).await {
            Ok(keys) => removed.extend(keys),
            Err(e) => tracing::warn!("cache sweep failed: {e}"),
        }
        removed.len()
    }

    async fn export(&self) -> Vec<CacheEntry> {
        match self.durable.export(now_millis()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cache export failed: {e}");
                Vec::new()
            }
        }
    }

    async fn import(&self, entries: Vec<CacheEntry>) -> usize {
        let mut imported = 0;
        for entry in entries {
            let query = CacheQuery {
                query: &entry.original_query,
                language: &entry.language,
                limit: entry.limit,
                kind: entry.kind_filter,
            };
            let ttl = Duration::from_millis(entry.ttl_millis);
            self.set(&query, entry.payload, Some(ttl)).await;
            imported += 1;
        }
        tracing::debug!(imported, "cache import finished");
        imported
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Which durable tier to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    File,
    Structured,
    Disabled,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(CacheBackend::File),
            "structured" => Ok(CacheBackend::Structured),
            "disabled" | "none" => Ok(CacheBackend::Disabled),
            other => Err(format!("unknown cache backend {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub backend: CacheBackend,
    pub directory: PathBuf,
    pub memory_capacity: usize,
    pub default_ttl: Duration,
}

/// File name of the SQLite database used by [`CacheBackend::Structured`].
pub const STRUCTURED_DB_FILE: &str = "cache.sqlite3";

pub fn open_cache(options: &CacheOptions) -> Result<Arc<dyn LookupCache>, CacheError> {
    let durable: Box<dyn DurableStore> = match options.backend {
        CacheBackend::Disabled => return Ok(Arc::new(DisabledCache)),
        CacheBackend::File => Box::new(FileStore::open(&options.directory)?),
        CacheBackend::Structured => {
            std::fs::create_dir_all(&options.directory)?;
            Box::new(StructuredStore::open(
                &options.directory.join(STRUCTURED_DB_FILE),
            )?)
        }
    };
    Ok(Arc::new(TieredCache::new(
        durable,
        options.memory_capacity,
        options.default_ttl,
    )))
}
