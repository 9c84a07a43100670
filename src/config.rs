use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub lexrel: LexrelConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Storage and lexicon locations
#[derive(Debug, Clone, Deserialize)]
pub struct LexrelConfig {
    pub db_path: PathBuf,
    /// JSON lexicon backing the lexical oracle. Optional: without it the
    /// heuristics fall back to their oracle-free behaviour.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Tuning for the relation generators
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Pending relation rows that trigger a flush to the store
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    #[serde(default = "default_synonym_min_confidence")]
    pub synonym_min_confidence: f64,
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
    #[serde(default = "default_similarity_batch_size")]
    pub similarity_batch_size: usize,
    /// 0 = min(available cpus, 8)
    #[serde(default)]
    pub similarity_workers: usize,
    #[serde(default = "default_root_min_confidence")]
    pub root_min_confidence: f64,
    #[serde(default = "default_confused_min_length")]
    pub confused_min_length: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            flush_threshold: default_flush_threshold(),
            synonym_min_confidence: default_synonym_min_confidence(),
            semantic_threshold: default_semantic_threshold(),
            similarity_batch_size: default_similarity_batch_size(),
            similarity_workers: 0,
            root_min_confidence: default_root_min_confidence(),
            confused_min_length: default_confused_min_length(),
        }
    }
}

impl GenerationConfig {
    pub fn worker_count(&self) -> usize {
        if self.similarity_workers > 0 {
            return self.similarity_workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(8)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Live status feed timing
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl StreamConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_flush_threshold() -> usize {
    200
}

fn default_synonym_min_confidence() -> f64 {
    0.6
}

fn default_semantic_threshold() -> f64 {
    0.8
}

fn default_similarity_batch_size() -> usize {
    100
}

fn default_root_min_confidence() -> f64 {
    0.75
}

fn default_confused_min_length() -> usize {
    5
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_idle_timeout_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LEXREL_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("LEXREL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let gen = &self.generation;

        if gen.flush_threshold == 0 {
            anyhow::bail!("generation.flush_threshold must be greater than 0");
        }

        for (name, value) in [
            ("synonym_min_confidence", gen.synonym_min_confidence),
            ("semantic_threshold", gen.semantic_threshold),
            ("root_min_confidence", gen.root_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("generation.{} must be between 0.0 and 1.0", name);
            }
        }

        if gen.similarity_batch_size == 0 {
            anyhow::bail!("generation.similarity_batch_size must be greater than 0");
        }

        if self.stream.poll_interval_ms == 0 {
            anyhow::bail!("stream.poll_interval_ms must be greater than 0");
        }

        if self.stream.idle_timeout_secs == 0 {
            anyhow::bail!("stream.idle_timeout_secs must be greater than 0");
        }

        if let Some(lexicon) = &self.lexrel.lexicon_path {
            if lexicon.exists() && !lexicon.is_file() {
                anyhow::bail!(
                    "lexicon_path must be a file, not a directory: {}",
                    lexicon.display()
                );
            }
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.lexrel.db_path
    }

    /// Get migrations directory
    pub fn migrations_dir(&self) -> &Path {
        &self.lexrel.migrations_dir
    }
}
