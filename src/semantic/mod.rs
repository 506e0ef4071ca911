//! On-device semantic embedding and retrieval for posts.
//!
//! # Architecture
//!
//! - `extract`: post → canonical text (URLs and mentions replaced)
//! - `language`: dominant-language detection with a default fallback
//! - `embeddings`: pluggable per-language embedding providers
//! - `vector`: unit normalization and similarity math
//! - `cache`: bounded LRU memory tier
//! - `store`: append-only persistent tier
//! - `prune`: TTL/capacity pruning and its background scheduler
//! - `actor`: the single worker that computes and writes vectors
//! - `retrieval`: ranking and centroids over cached vectors
//! - `engine`: the async facade tying it together

pub mod actor;
pub mod cache;
pub mod embeddings;
pub mod engine;
pub mod extract;
pub mod language;
pub mod prune;
pub mod retrieval;
pub mod store;
pub mod types;
pub mod vector;

pub use actor::{BatchReport, EmbedBatch};
pub use embeddings::{
    EmbeddingError, EmbeddingProvider, HashingLoader, HashingModel, LazyModels, ModelLoader,
    SentenceModel,
};
#[cfg(feature = "fastembed")]
pub use embeddings::{FastembedLoader, FastembedModel};
pub use engine::{EngineError, EngineStats, SemanticEngine};
pub use language::LanguageTag;
pub use store::StoreError;
pub use types::{InterestCentroid, PostRef, QueryVector, Scored, VectorRecord};

/// File name of the persistent vector log inside the engine's base path
pub const STORE_FILE: &str = "vectors.log";
