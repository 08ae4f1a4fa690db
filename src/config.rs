use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{cache, limits};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub search: SearchConfig,

    pub scrape: ScrapeConfig,

    pub compression: CompressionConfig,

    pub cache: CacheConfig,

    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            scrape: ScrapeConfig::default(),
            compression: CompressionConfig::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8090,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the meta-search backend.
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Base URL of the render-and-extract backend.
    pub base_url: String,

    /// Default per-request timeout when the caller does not supply one.
    pub default_timeout_seconds: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            default_timeout_seconds: limits::DEFAULT_CRAWL_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// OpenRouter-compatible chat-completions endpoint.
    pub base_url: String,

    /// API key; the `OPENROUTER_API_KEY` environment variable overrides this.
    pub api_key: String,

    pub model: String,

    pub system_prompt: String,

    pub request_timeout_seconds: u64,

    /// Character budget applied to serialized payloads before the
    /// summarization call.
    pub max_payload_chars: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            model: "google/gemini-2.0-flash-lite-001".to_string(),
            system_prompt: "Process the following content according to the user's instruction. \
                            Preserve key facts, names, numbers, and actionable information. \
                            Output only the result, no preamble."
                .to_string(),
            request_timeout_seconds: 60,
            max_payload_chars: limits::MAX_PAYLOAD_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    pub search_ttl_seconds: u64,

    pub crawl_ttl_seconds: u64,

    /// Soft bound on entries per cache; expired entries are pruned once the
    /// bound is exceeded.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_ttl_seconds: cache::SEARCH_TTL_SECONDS,
            crawl_ttl_seconds: cache::CRAWL_TTL_SECONDS,
            max_entries: cache::MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config.with_env_overrides())
    }

    #[must_use]
    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY")
            && !key.is_empty()
        {
            self.compression.api_key = key;
        }
        self
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("foray").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".foray").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.search.base_url).context("Invalid search backend base_url")?;
        url::Url::parse(&self.scrape.base_url).context("Invalid scrape backend base_url")?;
        url::Url::parse(&self.compression.base_url).context("Invalid compression base_url")?;

        if self.search.request_timeout_seconds == 0 {
            anyhow::bail!("Search request timeout must be > 0");
        }

        if !limits::CRAWL_TIMEOUT_RANGE.contains(&self.scrape.default_timeout_seconds) {
            anyhow::bail!(
                "Scrape default timeout must be between {} and {} seconds",
                limits::CRAWL_TIMEOUT_RANGE.start(),
                limits::CRAWL_TIMEOUT_RANGE.end()
            );
        }

        if self.compression.max_payload_chars == 0 {
            anyhow::bail!("Compression payload budget must be > 0");
        }

        Ok(())
    }
}
