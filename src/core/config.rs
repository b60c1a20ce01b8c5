//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `backend.base_url`
pub const BASE_URL_ENV: &str = "YTMP4_BASE_URL";
/// Overrides `logging.level`
pub const LOG_LEVEL_ENV: &str = "YTMP4_LOG";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Where the ytmp4 service lives and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub video_info_path: String,
    pub download_path: String,
    pub cache_stats_path: String,
    pub quick_fetch_path: String,
    /// No local timeout unless set
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

/// Cache statistics polling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub enabled: bool,
    pub stats_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub lifetime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            video_info_path: "/api/video-info".to_string(),
            download_path: "/api/download".to_string(),
            cache_stats_path: "/api/cache-stats".to_string(),
            quick_fetch_path: "/api/ytmp4".to_string(),
            timeout_seconds: None,
            user_agent: crate::utils::network::get_user_agent(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stats_interval_seconds: 10,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: crate::core::notifications::DEFAULT_LIFETIME_SECS as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform config file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Load and validate, then apply environment overrides
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Load, validate, and fall back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        Self::try_load(path).unwrap_or_else(|err| {
            tracing::warn!(
                "Failed to load configuration ({:#}), falling back to defaults",
                err
            );
            Self::from_env()
        })
    }

    /// Save configuration to the platform config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = self.export()?;

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "ytmp4", "client")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Reset configuration to defaults
    pub fn reset() -> Result<Self> {
        let config = Self::default();
        config.save()?;
        tracing::info!("Reset configuration to defaults");
        Ok(config)
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        Ok(config)
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Backend base URL overridden by {}", BASE_URL_ENV);
            self.backend.base_url = base_url.trim().to_string();
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| LOG_LEVELS.contains(&v.as_str())) {
            self.logging.level = level;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.backend.base_url)
            .with_context(|| format!("Invalid backend base URL: {}", self.backend.base_url))?;
        if !["http", "https"].contains(&base.scheme()) {
            anyhow::bail!("Backend base URL must use http or https");
        }

        for path in [
            &self.backend.video_info_path,
            &self.backend.download_path,
            &self.backend.cache_stats_path,
            &self.backend.quick_fetch_path,
        ] {
            if path.trim().is_empty() {
                anyhow::bail!("Endpoint paths must not be empty");
            }
        }

        if let Some(timeout) = self.backend.timeout_seconds {
            if timeout == 0 || timeout > 600 {
                anyhow::bail!("Timeout should be between 1 and 600 seconds");
            }
        }

        if self.polling.stats_interval_seconds == 0 {
            anyhow::bail!("Stats interval must be greater than 0");
        }

        if self.notifications.lifetime_seconds == 0 || self.notifications.lifetime_seconds > 300 {
            anyhow::bail!("Notification lifetime should be between 1 and 300 seconds");
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}
