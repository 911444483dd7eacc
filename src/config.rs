use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gamelore: GameloreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Gamelore-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GameloreConfig {
    /// Path to the SQLite database backing the durable document store
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Collection queried when a caller supplies an unknown domain tag
    #[serde(default = "default_collection")]
    pub default_collection: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GameloreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_collection: default_collection(),
            log_level: default_log_level(),
        }
    }
}

/// Chunking configuration for the ingestion pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size_chars: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_chars: default_chunk_size(),
            chunk_overlap_chars: default_chunk_overlap(),
        }
    }
}

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    /// "openai" to use the remote API when its key is set; anything else
    /// (or a missing key) selects the deterministic hashed embedder
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            batch_size: default_batch_size(),
            dimensions: default_dimensions(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_k")]
    pub default_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            min_score: default_min_score(),
        }
    }
}

/// Live-source configuration (rate limits, TTLs, endpoints).
///
/// Deserialized through a raw shadow struct so each source's TTL default
/// is resolved after parse: a `[sources.steamspy]` section that omits
/// `ttl_secs` still gets the day-long market default, not the forum one.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawSourcesConfig")]
pub struct SourcesConfig {
    /// Per-request timeout applied to each source fetch
    pub request_timeout_ms: u64,
    /// Capacity bound on the aggregator's merged-result cache
    pub cache_capacity: usize,
    pub reddit: SourceConfig,
    pub stackexchange: SourceConfig,
    pub steamspy: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self::from(RawSourcesConfig::default())
    }
}

/// Per-source knobs: whether it participates, its minimum inter-call
/// interval, and how long its cached results stay fresh
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub enabled: bool,
    pub min_interval_ms: u64,
    pub ttl_secs: u64,
    /// Override for tests; production endpoints are baked into each client
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSourcesConfig {
    request_timeout_ms: Option<u64>,
    cache_capacity: Option<usize>,
    reddit: RawSourceConfig,
    stackexchange: RawSourceConfig,
    steamspy: RawSourceConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSourceConfig {
    enabled: Option<bool>,
    min_interval_ms: Option<u64>,
    ttl_secs: Option<u64>,
    base_url: Option<String>,
}

impl RawSourceConfig {
    fn resolve(self, default_ttl_secs: u64) -> SourceConfig {
        SourceConfig {
            enabled: self.enabled.unwrap_or_else(default_enabled),
            min_interval_ms: self.min_interval_ms.unwrap_or_else(default_min_interval_ms),
            ttl_secs: self.ttl_secs.unwrap_or(default_ttl_secs),
            base_url: self.base_url,
        }
    }
}

impl From<RawSourcesConfig> for SourcesConfig {
    fn from(raw: RawSourcesConfig) -> Self {
        Self {
            request_timeout_ms: raw.request_timeout_ms.unwrap_or_else(default_request_timeout_ms),
            cache_capacity: raw.cache_capacity.unwrap_or_else(default_cache_capacity),
            reddit: raw.reddit.resolve(default_forum_ttl_secs()),
            stackexchange: raw.stackexchange.resolve(default_forum_ttl_secs()),
            steamspy: raw.steamspy.resolve(default_steamspy_ttl_secs()),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./gamelore.db")
}

fn default_collection() -> String {
    "patterns".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_dimensions() -> usize {
    256
}

fn default_k() -> usize {
    3
}

fn default_min_score() -> f32 {
    0.0
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_enabled() -> bool {
    true
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_forum_ttl_secs() -> u64 {
    // Forum discussion churns within hours, not minutes
    6 * 60 * 60
}

fn default_steamspy_ttl_secs() -> u64 {
    // Ownership estimates move slowly; keep them for a day
    24 * 60 * 60
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading
    /// config. Looks for the config file in this order:
    /// 1. Path specified in GAMELORE_CONFIG environment variable
    /// 2. ./config.toml in current directory (optional; defaults apply if absent)
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("GAMELORE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config = if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            toml::from_str(&config_str).context("Failed to parse config.toml")?
        } else {
            Config::default()
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size_chars == 0 {
            anyhow::bail!("chunking.chunk_size_chars must be greater than 0");
        }

        if self.chunking.chunk_overlap_chars >= self.chunking.chunk_size_chars {
            anyhow::bail!("chunking.chunk_overlap_chars must be less than chunk_size_chars");
        }

        if self.search.default_k == 0 {
            anyhow::bail!("search.default_k must be greater than 0");
        }

        if self.search.min_score < 0.0 || self.search.min_score > 1.0 {
            anyhow::bail!("search.min_score must be between 0.0 and 1.0");
        }

        if self.embeddings.dimensions == 0 {
            anyhow::bail!("embeddings.dimensions must be greater than 0");
        }

        for (name, source) in [
            ("reddit", &self.sources.reddit),
            ("stackexchange", &self.sources.stackexchange),
            ("steamspy", &self.sources.steamspy),
        ] {
            if source.enabled && source.ttl_secs == 0 {
                anyhow::bail!("sources.{}.ttl_secs must be greater than 0", name);
            }
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.gamelore.db_path
    }
}
