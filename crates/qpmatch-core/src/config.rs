//! Configuration types for qpmatch.
//!
//! [`Config::load`] reads `~/.config/qpmatch/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheBackend, CacheOptions};
use crate::engine::TransformOptions;
use crate::lexicon::Lexicon;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[engine]
max_candidates    = 3
include_labels    = false
search_limit      = 10
prefer_properties = false
max_span_size     = 3
language          = "en"

[lookup]
endpoint   = "https://www.wikidata.org/w/api.php"
timeout_ms = 5000
user_agent = "qpmatch/0.1 (https://github.com/qpmatch/qpmatch)"

[cache]
backend         = "file"
memory_capacity = 1000
ttl_secs        = 86400

# [lexicon]
# stop_words          = ["the", "a", "an", "and", "or", "of"]
# relation_indicators = ["born", "founded", "instance of"]
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/qpmatch/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

/// `[engine]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default)]
    pub include_labels: bool,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default)]
    pub prefer_properties: bool,
    #[serde(default = "default_max_span_size")]
    pub max_span_size: usize,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_max_candidates() -> usize { 3 }
fn default_search_limit() -> usize { 10 }
fn default_max_span_size() -> usize { 3 }
fn default_language() -> String { "en".to_string() }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            include_labels: false,
            search_limit: default_search_limit(),
            prefer_properties: false,
            max_span_size: default_max_span_size(),
            language: default_language(),
        }
    }
}

impl EngineConfig {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            max_candidates: self.max_candidates,
            include_labels: self.include_labels,
            search_limit: self.search_limit,
            prefer_properties: self.prefer_properties,
            max_span_size: self.max_span_size,
        }
    }
}

/// `[lookup]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_endpoint() -> String { "https://www.wikidata.org/w/api.php".to_string() }
fn default_timeout_ms() -> u64 { 5000 }
fn default_user_agent() -> String {
    "qpmatch/0.1 (https://github.com/qpmatch/qpmatch)".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// `[cache]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_backend")]
    pub backend: CacheBackend,
    /// Defaults to `$XDG_CACHE_HOME/qpmatch`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_backend() -> CacheBackend { CacheBackend::File }
fn default_memory_capacity() -> usize { crate::cache::DEFAULT_MEMORY_CAPACITY }
fn default_ttl_secs() -> u64 { crate::cache::DEFAULT_TTL.as_secs() }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            directory: None,
            memory_capacity: default_memory_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            backend: self.backend,
            directory: self.directory(),
            memory_capacity: self.memory_capacity,
            default_ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

/// `[lexicon]` section of `config.toml`. Either list replaces the built-in
/// English set when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    #[serde(default)]
    pub relation_indicators: Option<Vec<String>>,
}

impl LexiconConfig {
    pub fn lexicon(&self) -> Lexicon {
        Lexicon::with_overrides(
            self.stop_words.as_deref(),
            self.relation_indicators.as_deref(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/qpmatch/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Same as [`Config::load`] with an explicit file location.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("qpmatch")
        .join("config.toml")
}

fn default_cache_dir() -> PathBuf {
    std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".cache"))
        .join("qpmatch")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
