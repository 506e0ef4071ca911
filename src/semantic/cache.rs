//! Bounded in-memory vector cache with least-recently-used eviction.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::semantic::types::VectorRecord;

/// Default number of cached vectors.
pub const DEFAULT_MEMORY_CAPACITY: usize = 4096;

/// Cached record plus access bookkeeping. Never leaves this module.
struct CacheEntry {
    record: Arc<VectorRecord>,
    last_access: Instant,
}

/// Volatile post-id → vector map, shared by the write worker and readers.
///
/// Records are handed out as `Arc`s, so a reader keeps a consistent snapshot
/// even if the entry is replaced or evicted right after.
pub struct MemoryVectorCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryVectorCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        // Every mutation leaves the map consistent, so a poisoned lock is
        // still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a record, marking it most recently used.
    pub fn get(&self, post_id: &str) -> Option<Arc<VectorRecord>> {
        let mut entries = self.lock();
        let entry = entries.get_mut(post_id)?;
        entry.last_access = Instant::now();
        Some(entry.record.clone())
    }

    /// Insert or replace a record, evicting the least recently used entry
    /// when the cache is full.
    pub fn put(&self, record: Arc<VectorRecord>) {
        let post_id = record.post_id.clone();
        let entry = CacheEntry {
            record,
            last_access: Instant::now(),
        };

        let evicted = self.lock().push(post_id.clone(), entry);
        if let Some((evicted_id, evicted_entry)) = evicted {
            // push() also returns the old value when the key was replaced
            if evicted_id != post_id {
                log::trace!(
                    "evicted vector for {evicted_id} (idle {:?})",
                    evicted_entry.last_access.elapsed()
                );
            }
        }
    }

    /// Insert `record` unless memory already holds a newer one for the same
    /// post. Returns whichever record is cached afterwards.
    pub fn insert_if_newer(&self, record: Arc<VectorRecord>) -> Arc<VectorRecord> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(&record.post_id) {
            entry.last_access = Instant::now();
            if entry.record.computed_at > record.computed_at {
                return entry.record.clone();
            }
        }

        entries.push(
            record.post_id.clone(),
            CacheEntry {
                record: record.clone(),
                last_access: Instant::now(),
            },
        );
        record
    }

    /// Check membership without touching recency.
    pub fn contains(&self, post_id: &str) -> bool {
        self.lock().contains(post_id)
    }

    pub fn remove(&self, post_id: &str) -> Option<Arc<VectorRecord>> {
        self.lock().pop(post_id).map(|entry| entry.record)
    }

    /// Remove `post_id` only if the cached record is not newer than
    /// `computed_at`. Used when the persistent tier drops a record.
    pub fn remove_if_not_newer(&self, post_id: &str, computed_at: DateTime<Utc>) -> bool {
        let mut entries = self.lock();
        let stale = entries
            .peek(post_id)
            .map(|entry| entry.record.computed_at <= computed_at)
            .unwrap_or(false);
        if stale {
            entries.pop(post_id);
        }
        stale
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for MemoryVectorCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}
