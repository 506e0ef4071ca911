//! The single writer of vector records.
//!
//! One worker thread owns the embedding provider and therefore every model
//! instance, so at most one embedding computation is in flight at a time.
//! Jobs arrive over an mpsc channel:
//! - `Embed`: run a batch through extraction → detection → embedding →
//!   normalization → write-through to memory then disk
//! - `Query`: embed a search string (never cached)
//! - `Forget`: remove records from both tiers
//! - `Shutdown`: stop after the jobs queued before it
//!
//! Query jobs that arrive while a batch is running are answered between batch
//! items. Batches are prepared in chunks so a large batch never holds queries
//! back for more than one chunk's cache lookups.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tokio::sync::oneshot;

use crate::semantic::cache::MemoryVectorCache;
use crate::semantic::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::semantic::extract::TextExtractor;
use crate::semantic::language::{LanguageDetector, LanguageTag};
use crate::semantic::store::PersistentVectorStore;
use crate::semantic::types::{PostRef, QueryVector, VectorRecord};
use crate::semantic::vector;

/// Posts checked against the cache and prepared at once.
const PREPARE_CHUNK: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("vector worker has stopped")]
    WorkerGone,

    #[error("failed to start vector worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Per-batch outcome counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Posts whose vector was computed and written.
    pub embedded: usize,
    /// Posts skipped because memory held a fresh record.
    pub memory_hits: usize,
    /// Posts hydrated from the persistent store instead of computed.
    pub store_hits: usize,
    /// Posts with no text to embed.
    pub skipped_empty: usize,
    /// Posts that failed (no model, model error).
    pub failed: usize,
    /// True when the batch stopped early on request.
    pub cancelled: bool,
}

enum Job {
    Embed {
        posts: Vec<PostRef>,
        force: bool,
        cancel: Arc<AtomicBool>,
        done: oneshot::Sender<BatchReport>,
    },
    Query {
        text: String,
        language: LanguageTag,
        reply: oneshot::Sender<Option<QueryVector>>,
    },
    Forget {
        post_ids: Vec<String>,
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

/// Handle to a submitted batch. Dropping it does not cancel the batch.
pub struct EmbedBatch {
    cancel: Arc<AtomicBool>,
    done: oneshot::Receiver<BatchReport>,
}

impl EmbedBatch {
    /// Ask the worker to stop before the next item. Items already written
    /// stay written.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the batch to finish.
    pub async fn finished(self) -> Result<BatchReport, ActorError> {
        self.done.await.map_err(|_| ActorError::WorkerGone)
    }
}

/// Text pipeline settings shared by batch and query paths.
#[derive(Clone, Debug)]
pub struct Pipeline {
    pub extractor: TextExtractor,
    pub detector: LanguageDetector,
    /// Records younger than this count as cache hits.
    pub freshness: chrono::Duration,
}

pub struct VectorComputationActor {
    tx: Sender<Job>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl VectorComputationActor {
    pub fn spawn(
        provider: Box<dyn EmbeddingProvider>,
        pipeline: Pipeline,
        cache: Arc<MemoryVectorCache>,
        store: Arc<PersistentVectorStore>,
    ) -> Result<Self, ActorError> {
        let (tx, rx) = mpsc::channel();

        let worker = Worker {
            provider,
            pipeline,
            cache,
            store,
            pending: VecDeque::new(),
        };

        let handle = std::thread::Builder::new()
            .name("vector-worker".to_string())
            .spawn(move || worker.run(rx))?;

        Ok(Self {
            tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a batch. Posts with a fresh cached record are skipped unless
    /// `force` is set.
    pub fn embed(&self, posts: Vec<PostRef>, force: bool) -> EmbedBatch {
        let cancel = Arc::new(AtomicBool::new(false));
        let (done, done_rx) = oneshot::channel();

        let job = Job::Embed {
            posts,
            force,
            cancel: cancel.clone(),
            done,
        };
        if self.tx.send(job).is_err() {
            log::warn!("vector worker is gone, dropping embed batch");
        }

        EmbedBatch {
            cancel,
            done: done_rx,
        }
    }

    /// Embed already-cleaned query text. `None` when it cannot be embedded.
    pub async fn query_vector(&self, text: String, language: LanguageTag) -> Option<QueryVector> {
        let (reply, reply_rx) = oneshot::channel();
        if self
            .tx
            .send(Job::Query {
                text,
                language,
                reply,
            })
            .is_err()
        {
            log::warn!("vector worker is gone, cannot embed query");
            return None;
        }
        reply_rx.await.ok().flatten()
    }

    /// Remove records from memory and disk, ordered with queued writes.
    /// Returns how many of `post_ids` were held by either tier.
    pub async fn forget(&self, post_ids: Vec<String>) -> Result<usize, ActorError> {
        let (reply, reply_rx) = oneshot::channel();
        self.tx
            .send(Job::Forget { post_ids, reply })
            .map_err(|_| ActorError::WorkerGone)?;
        reply_rx.await.map_err(|_| ActorError::WorkerGone)
    }

    /// Stop the worker after already-queued jobs and wait for it.
    pub fn shutdown_blocking(&self) {
        let _ = self.tx.send(Job::Shutdown);

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(err) = handle.join() {
                log::error!("vector worker panicked: {err:?}");
            }
        }
    }
}

impl Drop for VectorComputationActor {
    fn drop(&mut self) {
        let _ = self.tx.send(Job::Shutdown);
    }
}

struct Worker {
    provider: Box<dyn EmbeddingProvider>,
    pipeline: Pipeline,
    cache: Arc<MemoryVectorCache>,
    store: Arc<PersistentVectorStore>,
    /// Jobs pulled off the channel while a batch was running.
    pending: VecDeque<Job>,
}

impl Worker {
    fn run(mut self, rx: Receiver<Job>) {
        log::debug!("vector worker started");

        loop {
            let job = match self.pending.pop_front() {
                Some(job) => job,
                None => match rx.recv() {
                    Ok(job) => job,
                    Err(_) => break,
                },
            };

            match job {
                Job::Embed {
                    posts,
                    force,
                    cancel,
                    done,
                } => {
                    let report = self.run_batch(posts, force, &cancel, &rx);
                    log::debug!("embed batch done: {report:?}");
                    let _ = done.send(report);
                }
                Job::Query {
                    text,
                    language,
                    reply,
                } => {
                    let _ = reply.send(self.query(&text, language));
                }
                Job::Forget { post_ids, reply } => {
                    let _ = reply.send(self.forget(&post_ids));
                }
                Job::Shutdown => break,
            }
        }

        log::debug!("vector worker stopped");
    }

    fn run_batch(
        &mut self,
        posts: Vec<PostRef>,
        force: bool,
        cancel: &AtomicBool,
        rx: &Receiver<Job>,
    ) -> BatchReport {
        let _span = tracing::debug_span!("embed_batch", size = posts.len(), force).entered();
        let mut report = BatchReport::default();
        let now = Utc::now();

        let mut seen = HashSet::new();
        let posts: Vec<PostRef> = posts
            .into_iter()
            .filter(|post| seen.insert(post.post_id.clone()))
            .collect();

        for chunk in posts.chunks(PREPARE_CHUNK) {
            if cancel.load(Ordering::Relaxed) {
                report.cancelled = true;
                break;
            }
            self.serve_queries(rx);

            let work: Vec<&PostRef> = chunk
                .iter()
                .filter(|post| force || !self.already_cached(&post.post_id, now, &mut report))
                .collect();

            let pipeline = &self.pipeline;
            let prepared: Vec<(String, String, LanguageTag)> = work
                .par_iter()
                .map(|post| {
                    let text = pipeline.extractor.extract(post);
                    let language = pipeline.detector.detect(&text);
                    (post.post_id.clone(), text, language)
                })
                .collect();

            for (post_id, text, language) in prepared {
                if cancel.load(Ordering::Relaxed) {
                    report.cancelled = true;
                    break;
                }
                self.serve_queries(rx);
                self.embed_one(post_id, &text, language, &mut report);
            }
            if report.cancelled {
                break;
            }
        }

        report
    }

    fn embed_one(&mut self, post_id: String, text: &str, language: LanguageTag, report: &mut BatchReport) {
        if text.is_empty() {
            log::debug!("skipping {post_id}: no text to embed");
            report.skipped_empty += 1;
            return;
        }

        match self.compute(text, &language) {
            Ok(vector) => {
                let record = Arc::new(VectorRecord {
                    post_id,
                    language,
                    vector,
                    computed_at: whole_seconds(Utc::now()),
                });
                self.write_through(record);
                report.embedded += 1;
            }
            Err(EmbeddingError::EmptyInput) => {
                log::debug!("skipping {post_id}: empty input");
                report.skipped_empty += 1;
            }
            Err(e) => {
                log::warn!("skipping {post_id}: {e}");
                report.failed += 1;
            }
        }
    }

    /// Memory first, then disk. Disk hits are copied into memory.
    fn already_cached(&self, post_id: &str, now: DateTime<Utc>, report: &mut BatchReport) -> bool {
        let freshness = self.pipeline.freshness;

        if let Some(record) = self.cache.get(post_id) {
            if !record.is_expired(now, freshness) {
                report.memory_hits += 1;
                return true;
            }
        }

        match self.store.load(post_id) {
            Ok(Some(record)) if !record.is_expired(now, freshness) => {
                self.cache.put(Arc::new(record));
                report.store_hits += 1;
                true
            }
            Ok(_) => false,
            Err(e) => {
                log::warn!("vector store read failed for {post_id}: {e}");
                false
            }
        }
    }

    fn compute(&mut self, text: &str, language: &LanguageTag) -> Result<Vec<f32>, EmbeddingError> {
        let mut embedding = self.provider.compute(text, language)?;
        vector::normalize(&mut embedding).map_err(|_| EmbeddingError::ZeroNorm)?;
        Ok(embedding)
    }

    /// Memory before disk, so memory is never older than disk.
    fn write_through(&self, record: Arc<VectorRecord>) {
        self.cache.put(record.clone());
        if let Err(e) = self.store.save(&record) {
            log::warn!("vector for {} not persisted: {e}", record.post_id);
        }
    }

    fn query(&mut self, text: &str, language: LanguageTag) -> Option<QueryVector> {
        match self.compute(text, &language) {
            Ok(vector) => Some(QueryVector { language, vector }),
            Err(e) => {
                log::debug!("query not embeddable: {e}");
                None
            }
        }
    }

    fn forget(&self, post_ids: &[String]) -> usize {
        let mut held = 0;
        for post_id in post_ids {
            let in_memory = self.cache.remove(post_id).is_some();
            if in_memory || self.store.contains(post_id) {
                held += 1;
            }
        }

        if let Err(e) = self.store.delete(post_ids) {
            log::warn!("failed to delete {} vectors from disk: {e}", post_ids.len());
        }
        held
    }

    fn serve_queries(&mut self, rx: &Receiver<Job>) {
        loop {
            match rx.try_recv() {
                Ok(Job::Query {
                    text,
                    language,
                    reply,
                }) => {
                    let _ = reply.send(self.query(&text, language));
                }
                Ok(job) => self.pending.push_back(job),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

/// Drop sub-second precision so memory and disk timestamps agree.
fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}
