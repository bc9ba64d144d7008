//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use hubstats_core::{HttpSettings, RetryPolicy};
use serde::Deserialize;

/// Global configuration for hubstats
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub hub: HubConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub base_url: String,
    /// Tag listed by `hubstats tensors`
    pub tag: String,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: hubstats_hub::DEFAULT_BASE_URL.to_string(),
            tag: "compressed-tensors".to_string(),
            page_size: hubstats_hub::DEFAULT_PAGE_SIZE,
            max_pages: hubstats_hub::DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub max_retries: u32,
    pub backoff_secs: u64,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        let settings = HttpSettings::default();
        Self {
            max_retries: retry.max_attempts,
            backoff_secs: retry.backoff_unit.as_secs(),
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            timeout_secs: settings.timeout.as_secs(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            backoff_unit: Duration::from_secs(self.backoff_secs),
        }
    }

    pub fn settings(&self) -> HttpSettings {
        let mut settings = HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            ..HttpSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        settings
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./hubstats.toml (current directory)
    /// 2. ~/.config/hubstats/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("hubstats.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "hubstats") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
