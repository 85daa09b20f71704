//! Durable tier backed by a single SQLite table.
//!
//! The connection lives behind a mutex and every statement runs on the
//! blocking pool, so callers on the async runtime never block on disk I/O.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheEntry, CacheKey, DurableStats, DurableStore, EntryAge};
use crate::error::CacheError;
use crate::types::KindFilter;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS lookup_cache (
        cache_key      TEXT PRIMARY KEY,
        payload        TEXT NOT NULL,
        created_at     INTEGER NOT NULL,
        ttl_ms         INTEGER NOT NULL,
        original_query TEXT NOT NULL,
        language       TEXT NOT NULL,
        result_limit   INTEGER NOT NULL,
        kind_filter    TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_lookup_cache_created
        ON lookup_cache(created_at);
";

pub struct StructuredStore {
    conn: Arc<Mutex<Connection>>,
}

impl StructuredStore {
    /// Open (or create) the database at `path` and initialize the table.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// A private database that disappears with the store.
    pub fn in_memory() -> Result<Self, CacheError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CacheError> {
        // WAL is unavailable for in-memory databases; ignore the result.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CacheError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&conn.lock())).await?
    }
}

/// Raw row; the payload is decoded separately so a corrupt payload can be told
/// apart from a database error.
struct Row {
    key: String,
    payload: String,
    created_at: i64,
    ttl_ms: i64,
    original_query: String,
    language: String,
    limit: i64,
    kind_filter: String,
}

impl Row {
    fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            payload: row.get(1)?,
            created_at: row.get(2)?,
            ttl_ms: row.get(3)?,
            original_query: row.get(4)?,
            language: row.get(5)?,
            limit: row.get(6)?,
            kind_filter: row.get(7)?,
        })
    }

    fn decode(self) -> Result<CacheEntry, CacheError> {
        let payload = serde_json::from_str(&self.payload)?;
        let kind_filter = self
            .kind_filter
            .parse::<KindFilter>()
            .map_err(|e| CacheError::Task(format!("corrupt row {}: {e}", self.key)))?;
        Ok(CacheEntry {
            key: CacheKey::from_stored(self.key),
            payload,
            created_at: self.created_at,
            ttl_millis: self.ttl_ms.max(0) as u64,
            original_query: self.original_query,
            language: self.language,
            limit: self.limit.max(0) as usize,
            kind_filter,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT cache_key, payload, created_at, ttl_ms, original_query, \
                              language, result_limit, kind_filter FROM lookup_cache";

#[async_trait]
impl DurableStore for StructuredStore {
    fn backend_name(&self) -> &'static str {
        "structured"
    }

    async fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let key = key.as_str().to_string();
        let row = self
            .with_conn(move |conn| {
                let sql = format!("{SELECT_COLUMNS} WHERE cache_key = ?1");
                Ok(conn.query_row(&sql, params![key], Row::from_sql).optional()?)
            })
            .await?;
        row.map(Row::decode).transpose()
    }

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let payload = serde_json::to_string(&entry.payload)?;
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO lookup_cache
                    (cache_key, payload, created_at, ttl_ms, original_query, language, result_limit, kind_filter)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    entry.key.as_str(),
                    payload,
                    entry.created_at,
                    i64::try_from(entry.ttl_millis).unwrap_or(i64::MAX),
                    entry.original_query,
                    entry.language,
                    entry.limit as i64,
                    entry.kind_filter.as_str(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), CacheError> {
        let key = key.as_str().to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM lookup_cache WHERE cache_key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM lookup_cache", [])?;
            Ok(())
        })
        .await
    }

    async fn stats(&self) -> Result<DurableStats, CacheError> {
        let now = super::now_millis();
        self.with_conn(move |conn| {
            let (entries, total_bytes): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(LENGTH(payload) + LENGTH(original_query)), 0)
                 FROM lookup_cache",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let edge = |order: &str| -> Result<Option<EntryAge>, CacheError> {
                let sql = format!(
                    "SELECT original_query, created_at FROM lookup_cache
                     ORDER BY created_at {order} LIMIT 1"
                );
                let found = conn
                    .query_row(&sql, [], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                    })
                    .optional()?;
                Ok(found.map(|(name, created_at)| EntryAge {
                    name,
                    age_ms: now.saturating_sub(created_at).max(0) as u64,
                }))
            };

            Ok(DurableStats {
                backend: "structured".to_string(),
                entries: entries.max(0) as usize,
                total_bytes: total_bytes.max(0) as u64,
                oldest: edge("ASC")?,
                newest: edge("DESC")?,
            })
        })
        .await
    }

    async fn sweep(&self, now_ms: i64) -> Result<Vec<CacheKey>, CacheError> {
        self.with_conn(move |conn| {
            let mut stale = Vec::new();
            {
                let mut stmt = conn.prepare(
                    "SELECT cache_key, payload, kind_filter, created_at, ttl_ms FROM lookup_cache",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })?;
                for row in rows {
                    let (key, payload, kind, created_at, ttl_ms) = row?;
                    let expired = now_ms.saturating_sub(created_at) >= ttl_ms;
                    let corrupt = serde_json::from_str::<serde_json::Value>(&payload).is_err()
                        || kind.parse::<KindFilter>().is_err();
                    if expired || corrupt {
                        stale.push(key);
                    }
                }
            }

            let tx = conn.unchecked_transaction()?;
            for key in &stale {
                tx.execute("DELETE FROM lookup_cache WHERE cache_key = ?1", params![key])?;
            }
            tx.commit()?;
            Ok(stale.into_iter().map(CacheKey::from_stored).collect())
        })
        .await
    }

    async fn export(&self, now_ms: i64) -> Result<Vec<CacheEntry>, CacheError> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at"))?;
                let rows = stmt
                    .query_map([], Row::from_sql)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row.key.clone();
            match row.decode() {
                Ok(entry) if entry.is_valid_at(now_ms) => entries.push(entry),
                Ok(_) => {}
                Err(e) => tracing::debug!(%key, "skipping corrupted cache row: {e}"),
            }
        }
        Ok(entries)
    }
}
