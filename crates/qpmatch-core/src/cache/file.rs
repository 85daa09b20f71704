//! Durable tier backed by a directory of JSON records, one per key.
//!
//! Records are written to a temporary sibling first and renamed into place, so
//! a reader never observes a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;

use super::{CacheEntry, CacheKey, DurableStats, DurableStore, EntryAge};
use crate::error::CacheError;

const RECORD_EXT: &str = "json";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the cache directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.{RECORD_EXT}"))
    }

    /// Every `*.json` file in the cache directory.
    async fn record_paths(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT) {
                out.push(path);
            }
        }
        Ok(out)
    }
}

async fn remove_if_present(path: &Path) -> Result<(), CacheError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// The key a record path was written under.
fn key_of(path: &Path) -> CacheKey {
    CacheKey::from_stored(
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    )
}

fn age_of(modified: SystemTime) -> u64 {
    SystemTime::now()
        .duration_since(modified)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[async_trait]
impl DurableStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let raw = match tokio::fs::read(self.record_path(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let body = serde_json::to_vec_pretty(entry)?;
        let path = self.record_path(&entry.key);
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{seq}.tmp", std::process::id()));
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), CacheError> {
        remove_if_present(&self.record_path(key)).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        for path in self.record_paths().await? {
            remove_if_present(&path).await?;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<DurableStats, CacheError> {
        let mut stats = DurableStats {
            backend: self.backend_name().to_string(),
            ..DurableStats::default()
        };
        let mut oldest: Option<(SystemTime, String)> = None;
        let mut newest: Option<(SystemTime, String)> = None;

        for path in self.record_paths().await? {
            let meta = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta,
                // Removed between listing and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            stats.entries += 1;
            stats.total_bytes += meta.len();

            let modified = meta.modified()?;
            let name = key_of(&path).to_string();
            if oldest.as_ref().map_or(true, |(t, _)| modified < *t) {
                oldest = Some((modified, name.clone()));
            }
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, name));
            }
        }

        stats.oldest = oldest.map(|(t, name)| EntryAge {
            name,
            age_ms: age_of(t),
        });
        stats.newest = newest.map(|(t, name)| EntryAge {
            name,
            age_ms: age_of(t),
        });
        Ok(stats)
    }

    async fn sweep(&self, now_ms: i64) -> Result<Vec<CacheKey>, CacheError> {
        let mut removed = Vec::new();
        for path in self.record_paths().await? {
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let stale = match serde_json::from_slice::<CacheEntry>(&raw) {
                Ok(entry) => !entry.is_valid_at(now_ms),
                Err(e) => {
                    tracing::debug!(path = %path.display(), "removing corrupted cache record: {e}");
                    true
                }
            };
            if stale {
                remove_if_present(&path).await?;
                removed.push(key_of(&path));
            }
        }
        Ok(removed)
    }

    async fn export(&self, now_ms: i64) -> Result<Vec<CacheEntry>, CacheError> {
        let mut entries = Vec::new();
        for path in self.record_paths().await? {
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_slice::<CacheEntry>(&raw) {
                Ok(entry) if entry.is_valid_at(now_ms) => entries.push(entry),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), "skipping corrupted cache record: {e}")
                }
            }
        }
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }
}
