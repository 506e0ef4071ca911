//! The engine facade used by the feed pipeline.
//!
//! Writes go through the `VectorComputationActor`. Reads (search, related
//! posts, centroids) only hydrate cached records and never compute new post
//! vectors. Query-path failures degrade to cache misses and are logged.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{ConfigError, EngineConfig};
use crate::semantic::actor::{ActorError, BatchReport, EmbedBatch, Pipeline, VectorComputationActor};
use crate::semantic::cache::MemoryVectorCache;
use crate::semantic::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::semantic::extract::TextExtractor;
use crate::semantic::language::{LanguageDetector, LanguageTag};
use crate::semantic::prune::{prune_tiers, PrunePolicy, PruningScheduler};
use crate::semantic::retrieval::{self, RankOptions};
use crate::semantic::store::{PersistentVectorStore, StoreError};
use crate::semantic::types::{InterestCentroid, PostRef, Scored, VectorRecord};
use crate::semantic::STORE_FILE;

/// Longest TTL accepted by `prune_now` (100 years).
const MAX_PRUNE_TTL_DAYS: i64 = 36_500;

/// Error type for engine setup and explicit batch operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vector worker has stopped")]
    WorkerGone,
}

impl From<ActorError> for EngineError {
    fn from(err: ActorError) -> Self {
        match err {
            ActorError::WorkerGone => EngineError::WorkerGone,
            ActorError::Spawn(e) => EngineError::Io(e),
        }
    }
}

/// Snapshot of tier sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineStats {
    pub memory_entries: usize,
    pub memory_capacity: usize,
    pub stored_records: usize,
}

pub struct SemanticEngine {
    config: EngineConfig,
    extractor: TextExtractor,
    detector: LanguageDetector,
    cache: Arc<MemoryVectorCache>,
    store: Arc<PersistentVectorStore>,
    actor: Arc<VectorComputationActor>,
    scheduler: Mutex<Option<PruningScheduler>>,
}

impl SemanticEngine {
    /// Open the engine rooted at `base_path` with an explicit provider.
    ///
    /// Must be called inside a tokio runtime: the pruning scheduler is
    /// spawned on it unless `prune_interval_secs` is 0.
    pub async fn open(
        config: EngineConfig,
        base_path: &Path,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        std::fs::create_dir_all(base_path)?;

        let identity = provider.identity();
        let store = Arc::new(PersistentVectorStore::open(
            base_path.join(STORE_FILE),
            &identity,
        )?);
        let cache = Arc::new(MemoryVectorCache::new(config.memory_capacity));

        log::info!(
            "semantic engine opened at {} (models: {identity}, {} stored vectors)",
            base_path.display(),
            store.len()
        );

        let pipeline = Pipeline {
            extractor: config.extractor(),
            detector: config.detector(),
            freshness: config.ttl(),
        };
        let actor = VectorComputationActor::spawn(provider, pipeline, cache.clone(), store.clone())?;

        let scheduler = config.prune_interval().map(|period| {
            PruningScheduler::start(store.clone(), cache.clone(), Self::policy_of(&config), period)
        });

        Ok(Self {
            extractor: config.extractor(),
            detector: config.detector(),
            config,
            cache,
            store,
            actor: Arc::new(actor),
            scheduler: Mutex::new(scheduler),
        })
    }

    /// Open the engine with fastembed models, reading (or creating)
    /// `config.yaml` in `base_path`. Models are cached under
    /// `<base_path>/models` and downloaded on first use.
    #[cfg(feature = "fastembed")]
    pub async fn open_default(base_path: &Path) -> Result<Self, EngineError> {
        use crate::semantic::embeddings::{FastembedLoader, LazyModels};

        let config = EngineConfig::load_with(base_path)?;
        let loader = FastembedLoader::new(
            base_path.to_path_buf(),
            config.models.clone(),
            config.fallback_model.clone(),
            config.download_timeout(),
        );
        Self::open(config, base_path, Box::new(LazyModels::new(loader))).await
    }

    fn policy_of(config: &EngineConfig) -> PrunePolicy {
        PrunePolicy {
            capacity: config.store_capacity,
            ttl: config.ttl(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Queue posts for embedding. Posts with a fresh record are skipped.
    /// Fire-and-forget: the returned handle may be dropped.
    pub fn embed_posts(&self, posts: Vec<PostRef>) -> EmbedBatch {
        self.actor.embed(posts, false)
    }

    /// Like `embed_posts`, but recomputes even when a record exists.
    pub fn recompute_posts(&self, posts: Vec<PostRef>) -> EmbedBatch {
        self.actor.embed(posts, true)
    }

    /// Embed posts and wait until every one has been processed.
    pub async fn precompute(&self, posts: Vec<PostRef>) -> Result<BatchReport, EngineError> {
        Ok(self.embed_posts(posts).finished().await?)
    }

    /// The cached record for `post`, from memory or disk. Never computes.
    pub async fn vector_for(&self, post: &PostRef) -> Option<Arc<VectorRecord>> {
        self.hydrate(vec![post.post_id.clone()]).await.into_iter().next()
    }

    /// Rank `candidates` by similarity to `query`. Candidates without a
    /// cached vector, or in another language than the query, are left out.
    pub async fn semantic_search(
        &self,
        query: &str,
        candidates: &[PostRef],
        top_k: usize,
    ) -> Vec<Scored> {
        if top_k == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let text = self.extractor.clean_query(query);
        if text.is_empty() {
            log::debug!("empty search query");
            return Vec::new();
        }
        let language = self.detector.detect(&text);

        let Some(query) = self.actor.query_vector(text, language).await else {
            return Vec::new();
        };

        let records = self.hydrate(ids_of(candidates)).await;
        retrieval::rank(&query.vector, &query.language, &records, RankOptions::top(top_k))
    }

    /// Rank `candidates` by similarity to `post`'s own vector, dropping
    /// anything below `min_cos`. Empty when `post` has no cached vector.
    pub async fn related_posts(
        &self,
        post: &PostRef,
        candidates: &[PostRef],
        top_k: usize,
        min_cos: f64,
    ) -> Vec<Scored> {
        let Some(subject) = self.vector_for(post).await else {
            log::debug!("no vector for {}, no related posts", post.post_id);
            return Vec::new();
        };

        let records = self.hydrate(ids_of(candidates)).await;
        let options = RankOptions {
            top_k,
            min_score: Some(min_cos as f32),
            exclude: Some(subject.post_id.as_str()),
        };
        retrieval::rank(&subject.vector, &subject.language, &records, options)
    }

    /// Average the cached vectors of `liked_posts` in `language`.
    pub async fn relevance_centroid(
        &self,
        liked_posts: &[PostRef],
        language: &LanguageTag,
    ) -> Option<InterestCentroid> {
        if liked_posts.is_empty() {
            return None;
        }
        let records = self.hydrate(ids_of(liked_posts)).await;
        retrieval::centroid(&records, language)
    }

    /// Rank `candidates` against a centroid. Similarity only; blending with
    /// recency is left to the caller.
    pub async fn rank_by_centroid(
        &self,
        centroid: &InterestCentroid,
        candidates: &[PostRef],
        top_k: usize,
    ) -> Vec<Scored> {
        let records = self.hydrate(ids_of(candidates)).await;
        retrieval::rank(&centroid.vector, &centroid.language, &records, RankOptions::top(top_k))
    }

    /// Prune both tiers now. Returns the number of records removed from disk,
    /// or 0 when pruning failed.
    pub async fn prune_now(&self, capacity: usize, ttl: Duration) -> usize {
        let max_ttl = chrono::Duration::days(MAX_PRUNE_TTL_DAYS);
        let policy = PrunePolicy {
            capacity,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(max_ttl).min(max_ttl),
        };

        let store = self.store.clone();
        let cache = self.cache.clone();
        match tokio::task::spawn_blocking(move || prune_tiers(&store, &cache, policy)).await {
            Ok(Ok(removed)) => removed,
            Ok(Err(e)) => {
                log::warn!("prune failed: {e}");
                0
            }
            Err(e) => {
                log::error!("prune task failed: {e}");
                0
            }
        }
    }

    /// Remove posts from both tiers. Returns how many had a record.
    pub async fn forget(&self, post_ids: &[String]) -> usize {
        match self.actor.forget(post_ids.to_vec()).await {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!("cannot forget vectors: {e}");
                0
            }
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            memory_entries: self.cache.len(),
            memory_capacity: self.cache.capacity(),
            stored_records: self.store.len(),
        }
    }

    /// Stop background pruning, finish queued jobs and stop the worker.
    pub async fn shutdown(&self) {
        let scheduler = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(scheduler) = scheduler {
            scheduler.stop();
        }

        let actor = self.actor.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || actor.shutdown_blocking()).await {
            log::error!("vector worker shutdown failed: {e}");
        }
        log::debug!("semantic engine shut down");
    }

    /// Fetch records for `post_ids`: memory first, then disk. Disk hits are
    /// copied into memory. Read errors count as misses.
    async fn hydrate(&self, post_ids: Vec<String>) -> Vec<Arc<VectorRecord>> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(post_ids.len());
        let mut misses = Vec::new();

        for post_id in post_ids {
            if !seen.insert(post_id.clone()) {
                continue;
            }
            match self.cache.get(&post_id) {
                Some(record) => records.push(record),
                None => misses.push(post_id),
            }
        }

        if misses.is_empty() {
            return records;
        }

        let store = self.store.clone();
        let cache = self.cache.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            misses
                .iter()
                .filter_map(|post_id| match store.load(post_id) {
                    Ok(Some(record)) => Some(cache.insert_if_newer(Arc::new(record))),
                    Ok(None) => None,
                    Err(e) => {
                        log::warn!("vector for {post_id} unreadable, treating as miss: {e}");
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await;

        match loaded {
            Ok(found) => records.extend(found),
            Err(e) => log::error!("vector hydration task failed: {e}"),
        }
        records
    }
}

fn ids_of(posts: &[PostRef]) -> Vec<String> {
    posts.iter().map(|post| post.post_id.clone()).collect()
}
