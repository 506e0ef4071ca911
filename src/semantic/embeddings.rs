//! Embedding providers.
//!
//! A provider turns `(text, language)` into a dense vector:
//! - `SentenceModel`: one loaded model instance
//! - `ModelLoader`: knows which model serves which language and how to load it
//! - `LazyModels`: the `EmbeddingProvider` that loads models on first use, one
//!   per language, and keeps them for the process lifetime. A failed load is
//!   retried once `retry_after` has passed.
//!
//! Two backends ship with the crate: fastembed (on-device ONNX sentence models,
//! behind the `fastembed` feature) and `HashingModel`, a deterministic
//! bag-of-words hashing embedder used in tests and as a zero-download backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::semantic::extract::is_placeholder;
use crate::semantic::language::LanguageTag;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("No embedding model available for language '{0}'")]
    ModelUnavailable(LanguageTag),

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    #[error("Embedding has no direction (zero or non-finite norm)")]
    ZeroNorm,
}

/// A single loaded sentence-embedding model.
///
/// Takes `&mut self` for inference: model instances are not assumed to be
/// callable from several threads at once.
pub trait SentenceModel: Send {
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Resolves languages to models.
pub trait ModelLoader: Send {
    /// Stable description of the model set. Vectors produced under a
    /// different identity are not comparable.
    fn identity(&self) -> String;

    /// Load the dedicated model for `language`, or `Ok(None)` if the language
    /// has none.
    fn load(&self, language: &LanguageTag) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError>;

    /// Load the model used for languages without a dedicated one.
    fn load_fallback(&self) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError>;
}

/// Capability to compute a raw (not yet normalized) embedding.
pub trait EmbeddingProvider: Send {
    fn identity(&self) -> String;

    fn compute(&mut self, text: &str, language: &LanguageTag) -> Result<Vec<f32>, EmbeddingError>;
}

/// Per-language model slot. `None` means the language has no dedicated model.
type Slot = Option<Box<dyn SentenceModel>>;

/// Wait before loading a model again after a failed load.
pub const DEFAULT_LOAD_RETRY: Duration = Duration::from_secs(30);

/// A load that failed, remembered until it may be retried.
struct LoadFailure {
    at: Instant,
    reason: String,
}

impl LoadFailure {
    fn new(error: &EmbeddingError) -> Self {
        Self {
            at: Instant::now(),
            reason: error.to_string(),
        }
    }
}

/// `Err` while a previous failure is younger than `retry_after`.
fn check_retry(failure: Option<&LoadFailure>, retry_after: Duration) -> Result<(), EmbeddingError> {
    match failure {
        Some(failure) if failure.at.elapsed() < retry_after => {
            Err(EmbeddingError::InitFailed(failure.reason.clone()))
        }
        _ => Ok(()),
    }
}

/// Lazily loads and caches one model per language.
///
/// Only outcomes of successful loads are cached. A language the loader has
/// no model for stays unavailable; a load error is reported as such and
/// retried on a later call.
pub struct LazyModels<L: ModelLoader> {
    loader: L,
    models: HashMap<LanguageTag, Slot>,
    /// `None` until the fallback has been loaded once.
    fallback: Option<Slot>,
    failures: HashMap<LanguageTag, LoadFailure>,
    fallback_failure: Option<LoadFailure>,
    retry_after: Duration,
}

impl<L: ModelLoader> LazyModels<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            models: HashMap::new(),
            fallback: None,
            failures: HashMap::new(),
            fallback_failure: None,
            retry_after: DEFAULT_LOAD_RETRY,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Number of languages with a resolved slot (loaded or known missing).
    pub fn resolved_languages(&self) -> usize {
        self.models.len()
    }

    fn model_for(&mut self, language: &LanguageTag) -> Result<&mut Box<dyn SentenceModel>, EmbeddingError> {
        if !self.models.contains_key(language) {
            check_retry(self.failures.get(language), self.retry_after)?;
            match self.loader.load(language) {
                Ok(slot) => {
                    if let Some(model) = &slot {
                        log::info!(
                            "loaded embedding model '{}' ({} dims) for '{language}'",
                            model.name(),
                            model.dimensions()
                        );
                    }
                    self.failures.remove(language);
                    self.models.insert(language.clone(), slot);
                }
                Err(e) => {
                    log::warn!("failed to load model for '{language}': {e}");
                    self.failures.insert(language.clone(), LoadFailure::new(&e));
                    return Err(e);
                }
            }
        }

        let has_dedicated = matches!(self.models.get(language), Some(Some(_)));
        if has_dedicated {
            return self
                .models
                .get_mut(language)
                .and_then(|slot| slot.as_mut())
                .ok_or_else(|| EmbeddingError::ModelUnavailable(language.clone()));
        }

        if self.fallback.is_none() {
            check_retry(self.fallback_failure.as_ref(), self.retry_after)?;
            match self.loader.load_fallback() {
                Ok(slot) => {
                    self.fallback_failure = None;
                    self.fallback = Some(slot);
                }
                Err(e) => {
                    log::warn!("failed to load fallback model: {e}");
                    self.fallback_failure = Some(LoadFailure::new(&e));
                    return Err(e);
                }
            }
        }
        self.fallback
            .as_mut()
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| EmbeddingError::ModelUnavailable(language.clone()))
    }
}

impl<L: ModelLoader> EmbeddingProvider for LazyModels<L> {
    fn identity(&self) -> String {
        self.loader.identity()
    }

    fn compute(&mut self, text: &str, language: &LanguageTag) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let model = self.model_for(language)?;

        let embedding = model.embed(text)?;
        if embedding.is_empty() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "model '{}' returned an empty vector",
                model.name()
            )));
        }
        Ok(embedding)
    }
}

/// Deterministic feature-hashing embedder.
///
/// Every word is hashed into one of `dimensions` buckets with a hash-derived
/// sign. Texts sharing words get positive cosine similarity; texts sharing none
/// are near-orthogonal. Placeholder tokens are ignored.
pub struct HashingModel {
    name: String,
    dimensions: usize,
}

impl HashingModel {
    pub fn new(dimensions: usize) -> Self {
        Self {
            name: format!("hashing-{dimensions}"),
            dimensions: dimensions.max(1),
        }
    }
}

impl SentenceModel for HashingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let tokens = text
            .split_whitespace()
            .filter(|w| !is_placeholder(w))
            .flat_map(|w| w.split(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty());

        for token in tokens {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[0..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        Ok(embedding)
    }
}

/// Loader producing `HashingModel`s, optionally for a restricted language set.
#[derive(Clone, Debug)]
pub struct HashingLoader {
    dimensions: usize,
    languages: Option<BTreeSet<LanguageTag>>,
    fallback: bool,
}

impl HashingLoader {
    /// Serve every language.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            languages: None,
            fallback: false,
        }
    }

    /// Serve only `languages`; others are unavailable unless a fallback is
    /// enabled.
    pub fn for_languages<I, T>(dimensions: usize, languages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<LanguageTag>,
    {
        Self {
            dimensions,
            languages: Some(languages.into_iter().map(Into::into).collect()),
            fallback: false,
        }
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

impl ModelLoader for HashingLoader {
    fn identity(&self) -> String {
        format!("hashing-{}", self.dimensions)
    }

    fn load(&self, language: &LanguageTag) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
        let served = self
            .languages
            .as_ref()
            .map(|langs| langs.contains(language))
            .unwrap_or(true);

        if served {
            Ok(Some(Box::new(HashingModel::new(self.dimensions))))
        } else {
            Ok(None)
        }
    }

    fn load_fallback(&self) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
        if self.fallback {
            Ok(Some(Box::new(HashingModel::new(self.dimensions))))
        } else {
            Ok(None)
        }
    }
}

/// Run `load` on a helper thread and give up after `timeout`.
///
/// A load that times out keeps running in the background and its result is
/// discarded.
pub fn load_with_timeout<T, F>(what: &str, timeout: Duration, load: F) -> Result<T, EmbeddingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("model-load".to_string())
        .spawn(move || {
            let _ = tx.send(load());
        })
        .map_err(|e| EmbeddingError::InitFailed(format!("cannot start loader for {what}: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(EmbeddingError::InitFailed(format!(
            "{what} not ready after {}s",
            timeout.as_secs_f32()
        ))),
        Err(RecvTimeoutError::Disconnected) => Err(EmbeddingError::InitFailed(format!(
            "loader for {what} exited without a result"
        ))),
    }
}

/// Describe a language → model-name table as a stable identity string.
pub fn describe_model_table(models: &BTreeMap<LanguageTag, String>, fallback: Option<&str>) -> String {
    let mut parts: Vec<String> = models
        .iter()
        .map(|(lang, name)| format!("{lang}={}", name.to_lowercase()))
        .collect();
    if let Some(fallback) = fallback {
        parts.push(format!("*={}", fallback.to_lowercase()));
    }
    parts.join(";")
}

#[cfg(feature = "fastembed")]
pub use self::fastembed_backend::{FastembedLoader, FastembedModel};

#[cfg(feature = "fastembed")]
mod fastembed_backend {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use fastembed::{InitOptions, TextEmbedding};

    use super::{describe_model_table, load_with_timeout, EmbeddingError, ModelLoader, SentenceModel};
    use crate::semantic::language::LanguageTag;

    /// Default download timeout for model files (5 minutes)
    const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

    /// Wrapper around fastembed's TextEmbedding model.
    pub struct FastembedModel {
        model: TextEmbedding,
        model_name: String,
        dimensions: usize,
    }

    impl FastembedModel {
        /// Create a new embedding model with the given name.
        ///
        /// The model will be downloaded on first use if not cached.
        /// Models are cached in the `models/` subdirectory of `cache_dir`.
        /// Download and initialization together are bounded by
        /// `download_timeout`.
        pub fn new(
            model_name: &str,
            cache_dir: PathBuf,
            download_timeout: Option<Duration>,
        ) -> Result<Self, EmbeddingError> {
            let model_enum = Self::parse_model_name(model_name)?;
            let timeout = download_timeout.unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT);

            let models_dir = cache_dir.join("models");
            std::fs::create_dir_all(&models_dir).map_err(|e| {
                EmbeddingError::InitFailed(format!("Failed to create models directory: {}", e))
            })?;

            let (model, dimensions) = load_with_timeout(&format!("model '{model_name}'"), timeout, move || {
                let options = InitOptions::new(model_enum)
                    .with_cache_dir(models_dir)
                    .with_show_download_progress(false);

                let mut model = TextEmbedding::try_new(options)
                    .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;
                let dimensions = Self::probe_dimensions(&mut model)?;
                Ok((model, dimensions))
            })?;

            Ok(Self {
                model,
                model_name: model_name.to_string(),
                dimensions,
            })
        }

        /// Parse model name string to fastembed enum.
        pub(crate) fn parse_model_name(
            name: &str,
        ) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
            match name.to_lowercase().as_str() {
                "all-minilm-l6-v2" | "allminiml6v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
                "all-minilm-l6-v2-q" | "allminiml6v2q" => {
                    Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q)
                }
                "bge-small-en-v1.5" | "bgesmallenv15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
                "bge-small-en-v1.5-q" | "bgesmallenv15q" => {
                    Ok(fastembed::EmbeddingModel::BGESmallENV15Q)
                }
                "bge-base-en-v1.5" | "bgebaseenv15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
                "bge-base-en-v1.5-q" | "bgebaseenv15q" => {
                    Ok(fastembed::EmbeddingModel::BGEBaseENV15Q)
                }
                "multilingual-e5-small" | "multilinguale5small" => {
                    Ok(fastembed::EmbeddingModel::MultilingualE5Small)
                }
                "multilingual-e5-base" | "multilinguale5base" => {
                    Ok(fastembed::EmbeddingModel::MultilingualE5Base)
                }
                "paraphrase-multilingual-minilm-l12-v2" | "paraphrasemlminilml12v2" => {
                    Ok(fastembed::EmbeddingModel::ParaphraseMLMiniLML12V2)
                }
                _ => Err(EmbeddingError::InvalidModel(format!(
                    "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5 (add -q suffix for quantized), multilingual-e5-small, multilingual-e5-base, paraphrase-multilingual-minilm-l12-v2",
                    name
                ))),
            }
        }

        /// Probe the model to determine embedding dimensions.
        fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, EmbeddingError> {
            let test_embeddings = model.embed(vec!["test"], None).map_err(|e| {
                EmbeddingError::InitFailed(format!("Failed to probe dimensions: {}", e))
            })?;

            test_embeddings
                .first()
                .map(|v| v.len())
                .ok_or_else(|| EmbeddingError::InitFailed("Model returned no embedding".to_string()))
        }
    }

    impl SentenceModel for FastembedModel {
        fn name(&self) -> &str {
            &self.model_name
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let embeddings = self
                .model
                .embed(vec![text], None)
                .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

            embeddings
                .into_iter()
                .next()
                .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding returned".to_string()))
        }
    }

    /// Loads fastembed models from a language → model-name table.
    pub struct FastembedLoader {
        cache_dir: PathBuf,
        models: BTreeMap<LanguageTag, String>,
        fallback: Option<String>,
        download_timeout: Duration,
    }

    impl FastembedLoader {
        pub fn new(
            cache_dir: PathBuf,
            models: BTreeMap<LanguageTag, String>,
            fallback: Option<String>,
            download_timeout: Duration,
        ) -> Self {
            Self {
                cache_dir,
                models,
                fallback,
                download_timeout,
            }
        }

        fn load_named(&self, name: &str) -> Result<Box<dyn SentenceModel>, EmbeddingError> {
            let model = FastembedModel::new(name, self.cache_dir.clone(), Some(self.download_timeout))?;
            Ok(Box::new(model))
        }
    }

    impl ModelLoader for FastembedLoader {
        fn identity(&self) -> String {
            describe_model_table(&self.models, self.fallback.as_deref())
        }

        fn load(
            &self,
            language: &LanguageTag,
        ) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
            match self.models.get(language) {
                Some(name) => self.load_named(name).map(Some),
                None => Ok(None),
            }
        }

        fn load_fallback(&self) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
            match &self.fallback {
                Some(name) => self.load_named(name).map(Some),
                None => Ok(None),
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::vector::cosine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_hashing_model_deterministic() {
        let mut model = HashingModel::new(64);
        let a = model.embed("I love cats").unwrap();
        let b = model.embed("I love cats").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hashing_model_shared_words_are_similar() {
        let mut model = HashingModel::new(1024);
        let cats = model.embed("cats").unwrap();
        let love_cats = model.embed("I love cats").unwrap();
        let dogs = model.embed("Dogs are great").unwrap();

        let related = cosine(&cats, &love_cats).unwrap();
        let unrelated = cosine(&cats, &dogs).unwrap();
        assert!(related > 0.4, "related={related}");
        assert!(related > unrelated);
    }

    #[test]
    fn test_hashing_model_ignores_placeholders() {
        let mut model = HashingModel::new(32);
        let v = model.embed("[link] [mention]").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_lazy_models_empty_input() {
        let mut provider = LazyModels::new(HashingLoader::new(16));
        let result = provider.compute("   ", &LanguageTag::new("en"));
        assert!(matches!(result, Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn test_lazy_models_unavailable_language() {
        let mut provider = LazyModels::new(HashingLoader::for_languages(16, ["en"]));
        assert!(provider.compute("hello there", &LanguageTag::new("en")).is_ok());

        let result = provider.compute("bonjour", &LanguageTag::new("fr"));
        assert!(matches!(result, Err(EmbeddingError::ModelUnavailable(lang)) if lang.as_str() == "fr"));
    }

    #[test]
    fn test_lazy_models_fallback() {
        let loader = HashingLoader::for_languages(16, ["en"]).with_fallback(true);
        let mut provider = LazyModels::new(loader);
        assert!(provider.compute("bonjour", &LanguageTag::new("fr")).is_ok());
    }

    #[test]
    fn test_models_cached_per_language() {
        let mut provider = LazyModels::new(HashingLoader::new(16));
        provider.compute("one", &LanguageTag::new("en")).unwrap();
        provider.compute("two", &LanguageTag::new("en")).unwrap();
        provider.compute("trois", &LanguageTag::new("fr")).unwrap();
        assert_eq!(provider.resolved_languages(), 2);
    }

    /// Fails the first `failures` loads of any kind, then serves hashing
    /// models.
    struct FlakyLoader {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    impl FlakyLoader {
        fn attempt(&self) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(EmbeddingError::InitFailed("download interrupted".to_string()))
            } else {
                Ok(Some(Box::new(HashingModel::new(16))))
            }
        }
    }

    impl ModelLoader for FlakyLoader {
        fn identity(&self) -> String {
            "flaky-16".to_string()
        }

        fn load(&self, language: &LanguageTag) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
            if language.as_str() == "en" {
                self.attempt()
            } else {
                Ok(None)
            }
        }

        fn load_fallback(&self) -> Result<Option<Box<dyn SentenceModel>>, EmbeddingError> {
            self.attempt()
        }
    }

    fn flaky(failures: usize) -> (FlakyLoader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = FlakyLoader {
            failures,
            calls: calls.clone(),
        };
        (loader, calls)
    }

    #[test]
    fn test_failed_load_is_retried() {
        let (loader, calls) = flaky(1);
        let mut provider = LazyModels::new(loader).with_retry_after(Duration::ZERO);
        let en = LanguageTag::new("en");

        let first = provider.compute("hello there", &en);
        assert!(matches!(first, Err(EmbeddingError::InitFailed(_))));
        assert_eq!(provider.resolved_languages(), 0);

        assert!(provider.compute("hello there", &en).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_load_waits_before_retry() {
        let (loader, calls) = flaky(1);
        let mut provider = LazyModels::new(loader).with_retry_after(Duration::from_secs(3600));
        let en = LanguageTag::new("en");

        assert!(provider.compute("hello there", &en).is_err());
        let second = provider.compute("hello there", &en);
        assert!(matches!(second, Err(EmbeddingError::InitFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_fallback_load_is_retried() {
        let (loader, calls) = flaky(1);
        let mut provider = LazyModels::new(loader).with_retry_after(Duration::ZERO);
        let fr = LanguageTag::new("fr");

        assert!(matches!(provider.compute("bonjour", &fr), Err(EmbeddingError::InitFailed(_))));
        assert!(provider.compute("bonjour", &fr).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_load_with_timeout_gives_up() {
        let result: Result<(), _> = load_with_timeout("slow model", Duration::from_millis(50), || {
            std::thread::sleep(Duration::from_secs(2));
            Ok(())
        });
        assert!(matches!(result, Err(EmbeddingError::InitFailed(msg)) if msg.contains("not ready")));
    }

    #[test]
    fn test_load_with_timeout_passes_result_through() {
        let ok = load_with_timeout("fast model", Duration::from_secs(5), || Ok(7usize));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<usize, _> = load_with_timeout("broken model", Duration::from_secs(5), || {
            Err(EmbeddingError::InvalidModel("broken".to_string()))
        });
        assert!(matches!(err, Err(EmbeddingError::InvalidModel(_))));
    }

    #[test]
    fn test_describe_model_table_stable() {
        let mut models = BTreeMap::new();
        models.insert(LanguageTag::new("ja"), "Multilingual-E5-Small".to_string());
        models.insert(LanguageTag::new("en"), "bge-small-en-v1.5".to_string());

        let id = describe_model_table(&models, Some("multilingual-e5-small"));
        assert_eq!(
            id,
            "en=bge-small-en-v1.5;ja=multilingual-e5-small;*=multilingual-e5-small"
        );
    }
}
