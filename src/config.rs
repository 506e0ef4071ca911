use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::semantic::cache::DEFAULT_MEMORY_CAPACITY;
use crate::semantic::extract::{TextExtractor, DEFAULT_MAX_TEXT_CHARS};
use crate::semantic::language::{LanguageDetector, LanguageTag, DEFAULT_MIN_DETECT_CHARS};
use crate::semantic::store::DEFAULT_STORE_CAPACITY;

const CONFIG_FILE: &str = "config.yaml";

/// Records older than this are recomputed and pruned (30 days)
const DEFAULT_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Upper bound for `ttl_secs` (100 years)
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;
const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_LANGUAGE: &str = "en";
/// English model (small and fast, 384 dims)
const DEFAULT_ENGLISH_MODEL: &str = "bge-small-en-v1.5";
/// Used for every language without a dedicated model
const DEFAULT_FALLBACK_MODEL: &str = "multilingual-e5-small";
/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration, stored as `config.yaml` under the engine's base path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of vectors kept in memory
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Maximum number of vectors kept on disk after pruning
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,

    /// Vector time-to-live in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Background prune period in seconds, 0 disables background pruning
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,

    /// Language assumed when detection is inconclusive
    #[serde(default = "default_language")]
    pub default_language: LanguageTag,

    #[serde(default = "default_min_detect_chars")]
    pub min_detect_chars: usize,

    /// Embed quoted post text together with the body
    #[serde(default = "default_include_quoted")]
    pub include_quoted: bool,

    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Language → model name
    #[serde(default = "default_models")]
    pub models: BTreeMap<LanguageTag, String>,

    /// Model for languages missing from `models`; `null` disables it
    #[serde(default = "default_fallback_model")]
    pub fallback_model: Option<String>,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
            store_capacity: default_store_capacity(),
            ttl_secs: default_ttl_secs(),
            prune_interval_secs: default_prune_interval_secs(),
            default_language: default_language(),
            min_detect_chars: default_min_detect_chars(),
            include_quoted: default_include_quoted(),
            max_text_chars: default_max_text_chars(),
            models: default_models(),
            fallback_model: default_fallback_model(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

fn default_memory_capacity() -> usize {
    DEFAULT_MEMORY_CAPACITY
}

fn default_store_capacity() -> usize {
    DEFAULT_STORE_CAPACITY
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_prune_interval_secs() -> u64 {
    DEFAULT_PRUNE_INTERVAL_SECS
}

fn default_language() -> LanguageTag {
    LanguageTag::new(DEFAULT_LANGUAGE)
}

fn default_min_detect_chars() -> usize {
    DEFAULT_MIN_DETECT_CHARS
}

fn default_include_quoted() -> bool {
    true
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

fn default_models() -> BTreeMap<LanguageTag, String> {
    let mut models = BTreeMap::new();
    models.insert(default_language(), DEFAULT_ENGLISH_MODEL.to_string());
    models
}

fn default_fallback_model() -> Option<String> {
    Some(DEFAULT_FALLBACK_MODEL.to_string())
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_capacity == 0 {
            return Err(ConfigError::Invalid("memory_capacity must be greater than 0".into()));
        }
        if self.store_capacity == 0 {
            return Err(ConfigError::Invalid("store_capacity must be greater than 0".into()));
        }
        if self.ttl_secs == 0 || self.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "ttl_secs must be between 1 and {MAX_TTL_SECS}, got {}",
                self.ttl_secs
            )));
        }
        if self.default_language.is_empty() {
            return Err(ConfigError::Invalid("default_language must not be empty".into()));
        }
        if self.max_text_chars == 0 {
            return Err(ConfigError::Invalid("max_text_chars must be greater than 0".into()));
        }
        if self.download_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "download_timeout_secs must be greater than 0".into(),
            ));
        }

        for (language, model) in &self.models {
            if language.is_empty() {
                return Err(ConfigError::Invalid("models contains an empty language tag".into()));
            }
            if model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "models.{language} must name a model"
                )));
            }
        }
        if matches!(&self.fallback_model, Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "fallback_model must name a model or be null".into(),
            ));
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing defaults when it does not
    /// exist yet.
    pub fn load_with(base_path: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(base_path);

        // create new if does not exist
        if !path.exists() {
            std::fs::create_dir_all(base_path)?;
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = std::fs::read_to_string(&path)?;
        let config: Self = serde_yml::from_str(&config_str)?;
        config.validate()?;

        // resave in case new fields were added
        if config_str != serde_yml::to_string(&config)? {
            log::debug!("upgrading {}", path.display());
            config.save(base_path)?;
        }

        Ok(config)
    }

    pub fn save(&self, base_path: &Path) -> Result<(), ConfigError> {
        let config_str = serde_yml::to_string(self)?;
        std::fs::write(Self::path_in(base_path), config_str)?;
        Ok(())
    }

    fn path_in(base_path: &Path) -> PathBuf {
        base_path.join(CONFIG_FILE)
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs.min(MAX_TTL_SECS) as i64)
    }

    /// `None` when background pruning is disabled.
    pub fn prune_interval(&self) -> Option<Duration> {
        (self.prune_interval_secs > 0).then(|| Duration::from_secs(self.prune_interval_secs))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn extractor(&self) -> TextExtractor {
        TextExtractor::new(self.include_quoted, self.max_text_chars)
    }

    pub fn detector(&self) -> LanguageDetector {
        LanguageDetector::new(self.default_language.clone(), self.min_detect_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::load_with(dir.path()).unwrap();

        assert_eq!(config, EngineConfig::default());
        assert!(dir.path().join("config.yaml").exists());
        assert_eq!(config.memory_capacity, 4096);
        assert_eq!(config.ttl_secs, 2_592_000);
        assert_eq!(config.models.get(&LanguageTag::new("en")).unwrap(), "bge-small-en-v1.5");
    }

    #[test]
    fn test_partial_file_gets_defaults_and_resaved() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "memory_capacity: 12\n").unwrap();

        let config = EngineConfig::load_with(dir.path()).unwrap();
        assert_eq!(config.memory_capacity, 12);
        assert_eq!(config.store_capacity, DEFAULT_STORE_CAPACITY);

        let saved = std::fs::read_to_string(dir.path().join("config.yaml")).unwrap();
        assert!(saved.contains("store_capacity"));
    }

    #[test]
    fn test_null_fallback_disables_it() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "fallback_model: null\n").unwrap();

        let config = EngineConfig::load_with(dir.path()).unwrap();
        assert!(config.fallback_model.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "memory_capacity: 0\n").unwrap();
        assert!(matches!(
            EngineConfig::load_with(dir.path()),
            Err(ConfigError::Invalid(_))
        ));

        let config = EngineConfig {
            default_language: LanguageTag::new("  "),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "memory_capacity: [oops\n").unwrap();
        assert!(matches!(
            EngineConfig::load_with(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_durations() {
        let config = EngineConfig {
            prune_interval_secs: 0,
            ..EngineConfig::default()
        };
        assert!(config.prune_interval().is_none());
        assert_eq!(config.ttl(), chrono::Duration::days(30));
    }
}
