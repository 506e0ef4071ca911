//! Cross-module tests running the engine end to end on the hashing backend.

use std::path::Path;

use crate::config::EngineConfig;
use crate::semantic::embeddings::{HashingLoader, LazyModels};
use crate::semantic::SemanticEngine;

mod retrieval;

/// Dimensions of the hashing model used by these tests. Large enough that
/// unrelated short posts rarely share a bucket.
const DIMS: usize = 512;

fn test_config() -> EngineConfig {
    EngineConfig {
        prune_interval_secs: 0,
        ..EngineConfig::default()
    }
}

async fn open_with(config: EngineConfig, base: &Path, loader: HashingLoader) -> SemanticEngine {
    crate::logging::init_logging("debug");
    SemanticEngine::open(config, base, Box::new(LazyModels::new(loader)))
        .await
        .unwrap()
}

async fn open_engine(base: &Path) -> SemanticEngine {
    open_with(test_config(), base, HashingLoader::new(DIMS)).await
}
