//! In-process tier: bounded map with insertion-order eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{CacheEntry, CacheKey};

pub struct MemoryTier {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Arc<CacheEntry>>,
    /// Keys in first-insertion order. Replacing an entry does not move it.
    order: VecDeque<CacheKey>,
}

impl Inner {
    fn forget(&mut self, key: &CacheKey) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entry if present and still valid at `now_ms`. An expired
    /// entry is evicted on the way out.
    pub fn get(&self, key: &CacheKey, now_ms: i64) -> Option<Arc<CacheEntry>> {
        let mut inner = self.inner.lock();
        let entry = inner.entries.get(key)?;
        if entry.is_valid_at(now_ms) {
            return Some(Arc::clone(entry));
        }
        inner.forget(key);
        None
    }

    pub fn insert(&self, entry: impl Into<Arc<CacheEntry>>) {
        if self.capacity == 0 {
            return;
        }
        let entry = entry.into();
        let mut inner = self.inner.lock();
        let key = entry.key.clone();
        if let Some(slot) = inner.entries.get_mut(&key) {
            *slot = entry;
            return;
        }
        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, entry);
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.inner.lock().forget(key)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Evict everything expired at `now_ms`; returns the evicted keys.
    pub fn sweep(&self, now_ms: i64) -> Vec<CacheKey> {
        let mut inner = self.inner.lock();
        let expired: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(_, e)| !e.is_valid_at(now_ms))
            .map(|(k, _)| k.clone())
            .collect();
        let Inner { entries, order } = &mut *inner;
        for key in &expired {
            entries.remove(key);
        }
        order.retain(|k| entries.contains_key(k));
        expired
    }
}
