use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default number of entries per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Entries per page for folder listings and search
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Initialize configuration from file and environment
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.load_from_env();
        Ok(config)
    }

    /// Candidate config files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.docshelf.json"),
            PathBuf::from("./docshelf.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("docshelf").join("docshelf.json"));
        }

        paths
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration from a JSON file; missing keys keep their defaults
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Invalid configuration in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Apply overrides from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = var("DOCSHELF_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(timeout) = var("DOCSHELF_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.timeout_ms = timeout;
        }

        if let Some(page_size) = var("DOCSHELF_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.page_size = page_size;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(anyhow!("Base URL is required. Set DOCSHELF_BASE_URL or pass --base-url."));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("Base URL must start with http:// or https://, got '{}'", url));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than 0"));
        }

        if self.page_size == 0 {
            return Err(anyhow!("page_size must be greater than 0"));
        }

        Ok(())
    }
}
