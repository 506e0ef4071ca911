//! Background pruning of the persistent tier.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::semantic::cache::MemoryVectorCache;
use crate::semantic::store::{PersistentVectorStore, StoreError};

/// Limits applied on every prune pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrunePolicy {
    pub capacity: usize,
    pub ttl: chrono::Duration,
}

/// Prune the store and drop the same records from memory, unless memory
/// already holds a newer version. Returns the number of removed records.
///
/// Blocking; call from a blocking context.
pub fn prune_tiers(
    store: &PersistentVectorStore,
    cache: &MemoryVectorCache,
    policy: PrunePolicy,
) -> Result<usize, StoreError> {
    let removed = store.prune(policy.capacity, policy.ttl, Utc::now())?;

    let mut evicted = 0;
    for (post_id, computed_at) in &removed {
        if cache.remove_if_not_newer(post_id, *computed_at) {
            evicted += 1;
        }
    }

    if !removed.is_empty() {
        log::info!(
            "pruned {} vectors ({evicted} also dropped from memory), {} remain",
            removed.len(),
            store.len()
        );
    }
    Ok(removed.len())
}

/// Runs `prune_tiers` on a fixed period. The first pass runs right away, so
/// starting the scheduler also prunes at startup.
pub struct PruningScheduler {
    task: JoinHandle<()>,
}

impl PruningScheduler {
    /// Spawn the pruning task on the current tokio runtime.
    pub fn start(
        store: Arc<PersistentVectorStore>,
        cache: Arc<MemoryVectorCache>,
        policy: PrunePolicy,
        period: Duration,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let store = store.clone();
                let cache = cache.clone();
                let result =
                    tokio::task::spawn_blocking(move || prune_tiers(&store, &cache, policy)).await;

                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => log::warn!("scheduled prune failed: {e}"),
                    Err(e) => log::error!("scheduled prune task panicked: {e}"),
                }
            }
        });

        log::debug!("pruning scheduler started (every {period:?})");
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PruningScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::language::LanguageTag;
    use crate::semantic::types::VectorRecord;
    use chrono::DateTime;
    use tempfile::TempDir;

    fn record(id: &str, computed_at: DateTime<Utc>) -> VectorRecord {
        VectorRecord {
            post_id: id.to_string(),
            language: LanguageTag::new("en"),
            vector: vec![0.6, 0.8],
            computed_at: DateTime::<Utc>::from_timestamp(computed_at.timestamp(), 0).unwrap(),
        }
    }

    fn open_store(dir: &TempDir) -> Arc<PersistentVectorStore> {
        Arc::new(PersistentVectorStore::open(dir.path().join("vectors.log"), "test-model").unwrap())
    }

    #[test]
    fn test_prune_tiers_keeps_newer_memory_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let cache = MemoryVectorCache::new(8);
        let old = Utc::now() - chrono::Duration::days(10);

        let stale = record("stale", old);
        store.save(&stale).unwrap();
        cache.put(Arc::new(stale));

        // memory already holds a recomputed record the store does not have yet
        store.save(&record("fresh", old)).unwrap();
        cache.put(Arc::new(record("fresh", Utc::now())));

        let policy = PrunePolicy {
            capacity: 100,
            ttl: chrono::Duration::days(1),
        };
        assert_eq!(prune_tiers(&store, &cache, policy).unwrap(), 2);
        assert!(store.is_empty());
        assert!(!cache.contains("stale"));
        assert!(cache.contains("fresh"));
    }

    #[test]
    fn test_prune_tiers_noop() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let cache = MemoryVectorCache::new(8);
        store.save(&record("p1", Utc::now())).unwrap();

        let policy = PrunePolicy {
            capacity: 10,
            ttl: chrono::Duration::days(1),
        };
        assert_eq!(prune_tiers(&store, &cache, policy).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_scheduler_prunes_on_start() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let cache = Arc::new(MemoryVectorCache::new(8));
        let now = Utc::now();
        for i in 0..5 {
            store
                .save(&record(&format!("p{i}"), now - chrono::Duration::minutes(i)))
                .unwrap();
        }

        let policy = PrunePolicy {
            capacity: 2,
            ttl: chrono::Duration::days(1),
        };
        let scheduler =
            PruningScheduler::start(store.clone(), cache, policy, Duration::from_secs(3600));

        let mut waited = 0;
        while store.len() > 2 && waited < 200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        scheduler.stop();

        assert_eq!(store.len(), 2);
        assert!(store.contains("p0"));
        assert!(store.contains("p1"));
    }
}
