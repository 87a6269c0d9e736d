//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the statute search engine with validation and
//! type-safe access to all tunables.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks with field-level error messages
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (`STATUTE_SEARCH_*`)
//! 2. Configuration file
//! 3. Default values
//!
//! ## Usage
//! ```rust,no_run
//! use statute_search::config::Config;
//!
//! let config = Config::from_file("config.toml")?;
//! println!("Similarity floor: {}", config.search.min_score);
//! # Ok::<(), statute_search::SearchError>(())
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Corpus input settings
    pub corpus: CorpusConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Tokenizer behavior
    pub tokenizer: TokenizerConfig,
    /// Persistent index cache
    pub cache: CacheConfig,
    /// Logging
    pub logging: LoggingConfig,
}

/// Corpus input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to the corpus JSON file (an array of section records)
    pub path: PathBuf,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default maximum number of results per query
    pub max_results: usize,
    /// Minimum cosine similarity a candidate must exceed (strictly) to be
    /// returned from vector search; empirically chosen to exclude noise
    pub min_score: f64,
}

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Tokens with this many characters or fewer are dropped
    pub min_token_chars: usize,
    /// Additional stopwords merged into the built-in English list
    pub extra_stopwords: Vec<String>,
}

/// Persistent index cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the cache; when disabled every startup rebuilds from the corpus
    pub enabled: bool,
    /// Cache database path
    pub path: PathBuf,
    /// Gzip-compress the stored snapshot blob
    pub compress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit structured JSON logs
    pub json_format: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/corpus.json"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_score: 0.05,
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_chars: 2,
            extra_stopwords: Vec::new(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./data/index_cache"),
            compress: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error: defaults are used with a warning, so
    /// the engine can run unconfigured.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
                message: format!("failed to read config file {:?}: {}", path, e),
            })?;
            toml::from_str(&content).map_err(|e| SearchError::Config {
                message: format!("failed to parse config file {:?}: {}", path, e),
            })?
        } else {
            tracing::warn!("configuration file not found: {:?}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(corpus) = std::env::var("STATUTE_SEARCH_CORPUS") {
            self.corpus.path = PathBuf::from(corpus);
        }
        if let Ok(cache_path) = std::env::var("STATUTE_SEARCH_CACHE_PATH") {
            self.cache.path = PathBuf::from(cache_path);
        }
        if let Ok(level) = std::env::var("STATUTE_SEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(max_results) = std::env::var("STATUTE_SEARCH_MAX_RESULTS") {
            self.search.max_results = max_results.parse().map_err(|_| SearchError::Config {
                message: "invalid number in STATUTE_SEARCH_MAX_RESULTS".to_string(),
            })?;
        }
        if let Ok(min_score) = std::env::var("STATUTE_SEARCH_MIN_SCORE") {
            self.search.min_score = min_score.parse().map_err(|_| SearchError::Config {
                message: "invalid number in STATUTE_SEARCH_MIN_SCORE".to_string(),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            return Err(SearchError::Config {
                message: "search.max_results must be at least 1".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.search.min_score) {
            return Err(SearchError::Config {
                message: format!(
                    "search.min_score must be in [0.0, 1.0), got {}",
                    self.search.min_score
                ),
            });
        }
        if self.cache.enabled && self.cache.path.as_os_str().is_empty() {
            return Err(SearchError::Config {
                message: "cache.path must not be empty when the cache is enabled".to_string(),
            });
        }
        Ok(())
    }
}
