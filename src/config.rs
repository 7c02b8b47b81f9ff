use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TalentConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub extraction: ExtractionConfig,
    pub search: SearchConfig,
    pub sync: SyncConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `"openai"` (HTTP API) or `"hash"` (offline feature hashing).
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub dimensions: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractionConfig {
    /// `"chat"` (LLM over HTTP) or `"lexicon"` (offline vocabulary match).
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_threshold: f64,
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_secs: u64,
    pub backfill_batch_size: usize,
    pub backfill_delay_ms: u64,
    pub snapshot_chars: usize,
    pub refresh_on_rank: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RankingConfig {
    pub max_concurrency: usize,
    /// `"lexical"` or `"embedding"`.
    pub similarity: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_talentmatch_dir()
            .join("talent.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-3-small".into(),
            endpoint: "https://api.openai.com/v1/embeddings".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            dimensions: 1536,
            max_retries: 2,
            timeout_secs: 30,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: "chat".into(),
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.3,
            default_limit: 10,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 3,
            backfill_batch_size: 50,
            backfill_delay_ms: 500,
            snapshot_chars: 1000,
            refresh_on_rank: true,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            similarity: "lexical".into(),
        }
    }
}

/// Returns `~/.talentmatch/`
pub fn default_talentmatch_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".talentmatch")
}

/// Returns the default config file path: `~/.talentmatch/config.toml`
pub fn default_config_path() -> PathBuf {
    default_talentmatch_dir().join("config.toml")
}

impl TalentConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TalentConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (TALENTMATCH_DB, TALENTMATCH_LOG_LEVEL, TALENTMATCH_EMBEDDING_PROVIDER).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TALENTMATCH_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TALENTMATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("TALENTMATCH_EMBEDDING_PROVIDER") {
            self.embedding.provider = val;
        }
    }

    /// Startup validation. Anything rejected here is a configuration error,
    /// not a per-request failure.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.embedding.dimensions == 0 {
            return Err(EngineError::Config(
                "embedding.dimensions must be positive".into(),
            ));
        }
        if !matches!(self.embedding.provider.as_str(), "openai" | "hash") {
            return Err(EngineError::Config(format!(
                "unknown embedding provider: {}",
                self.embedding.provider
            )));
        }
        if !matches!(self.extraction.provider.as_str(), "chat" | "lexicon") {
            return Err(EngineError::Config(format!(
                "unknown extraction provider: {}",
                self.extraction.provider
            )));
        }
        if !matches!(self.ranking.similarity.as_str(), "lexical" | "embedding") {
            return Err(EngineError::Config(format!(
                "unknown similarity mode: {}",
                self.ranking.similarity
            )));
        }
        if !(0.0..=1.0).contains(&self.search.default_threshold) {
            return Err(EngineError::Config(
                "search.default_threshold must be within [0, 1]".into(),
            ));
        }
        if self.ranking.max_concurrency == 0 {
            return Err(EngineError::Config(
                "ranking.max_concurrency must be at least 1".into(),
            ));
        }
        if self.sync.snapshot_chars == 0 {
            return Err(EngineError::Config(
                "sync.snapshot_chars must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
