pub mod config;
pub mod logging;
pub mod semantic;
#[cfg(test)]
mod tests;

pub use config::{ConfigError, EngineConfig};
pub use logging::init_logging;
pub use semantic::{
    BatchReport, EmbedBatch, EngineError, EngineStats, InterestCentroid, LanguageTag, PostRef,
    QueryVector, Scored, SemanticEngine, VectorRecord,
};
