use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1 or "auto")
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO 639-1)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Chunking config
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Cache config
    #[serde(default)]
    pub cache: CacheConfig,

    /// History config
    #[serde(default)]
    pub history: HistoryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    // @backend: Google Translate web widget endpoint
    Google,
    // @backend: Public LibreTranslate instances
    LibreTranslate,
    // @backend: Lingva (Google Translate proxy) instances
    Lingva,
}

impl BackendKind {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google Translate",
            Self::LibreTranslate => "LibreTranslate",
            Self::Lingva => "Lingva",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Lingva => "lingva".to_string(),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "libretranslate" => Ok(Self::LibreTranslate),
            "lingva" => Ok(Self::Lingva),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// One backend in the priority-ordered chain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    // @field: Backend type identifier
    #[serde(rename = "type")]
    pub kind: BackendKind,

    // @field: Equivalent mirrors, tried in order
    #[serde(default)]
    pub endpoints: Vec<String>,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    // @param kind: Backend enum
    // @returns: Backend config with default mirrors
    pub fn new(kind: BackendKind) -> Self {
        let endpoints = match kind {
            BackendKind::Google => default_google_endpoints(),
            BackendKind::LibreTranslate => default_libretranslate_endpoints(),
            BackendKind::Lingva => default_lingva_endpoints(),
        };

        Self {
            kind,
            endpoints,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Maximum accepted input size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Characters shown by the preview command
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: default_max_chunk_length(),
            max_file_size: default_max_file_size(),
            preview_length: default_preview_length(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Backends in priority order
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            common: TranslationCommonConfig::default(),
        }
    }
}

/// Common translation settings applicable to all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Rate limit delay in milliseconds after each successful request
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Total attempts over the whole backend chain
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum characters sent to a backend in one request
    #[serde(default = "default_max_request_chars")]
    pub max_request_chars: usize,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_request_chars: default_max_request_chars(),
        }
    }
}

/// Translation cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Age after which durable entries are ignored
    #[serde(default = "default_cache_ttl_days")]
    pub ttl_days: u32,

    /// SQLite database path, defaults to the user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_days: default_cache_ttl_days(),
            database_path: None,
        }
    }
}

/// Translation history configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Number of entries kept
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_history_max_entries(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_max_chunk_length() -> usize {
    5000
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100 MiB
}

fn default_preview_length() -> usize {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms default delay between requests
}

/// Upper bound accepted for `translation.common.retry_count`
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_max_request_chars() -> usize {
    5000
}

fn default_cache_ttl_days() -> u32 {
    7
}

fn default_history_max_entries() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_google_endpoints() -> Vec<String> {
    vec!["https://translate.googleapis.com/translate_a/single".to_string()]
}

fn default_libretranslate_endpoints() -> Vec<String> {
    vec![
        "https://libretranslate.de/translate".to_string(),
        "https://translate.argosopentech.com/translate".to_string(),
        "https://translate.api.skitzen.com/translate".to_string(),
    ]
}

fn default_lingva_endpoints() -> Vec<String> {
    vec![
        "https://lingva.ml/api/v1".to_string(),
        "https://translate.plausibility.cloud/api/v1".to_string(),
        "https://lingva.garudalinux.org/api/v1".to_string(),
    ]
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig::new(BackendKind::Google),
        BackendConfig::new(BackendKind::LibreTranslate),
        BackendConfig::new(BackendKind::Lingva),
    ]
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Load the file at `path`, or write and return the defaults if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Self::default();
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language != "auto" {
            crate::language_utils::get_language_name(&self.source_language)?;
        }
        crate::language_utils::get_language_name(&self.target_language)?;

        if self.chunking.max_chunk_length == 0 {
            return Err(anyhow!("chunking.max_chunk_length must be greater than zero"));
        }

        if self.translation.backends.is_empty() {
            return Err(anyhow!("At least one translation backend must be configured"));
        }

        if let Some(backend) = self.translation.backends.iter().find(|b| b.endpoints.is_empty()) {
            return Err(anyhow!("Backend '{}' has no endpoints", backend.kind));
        }

        let retry_count = self.translation.common.retry_count;
        if retry_count == 0 || retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!(
                "translation.common.retry_count must be between 1 and {}, got {}",
                MAX_RETRY_COUNT,
                retry_count
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            chunking: ChunkingConfig::default(),
            translation: TranslationConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
