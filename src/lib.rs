//! ytmp4 client - Core Library
//!
//! Client-side orchestration for the ytmp4 download service: URL validation,
//! the analyze → download request flow, transient status notifications and
//! periodic cache statistics.

pub mod commands;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    backend::{Backend, HttpBackend},
    config::AppConfig,
    error_handling::{ClientError, ClientResult},
    models::{DownloadKind, DownloadResult, DownloadTrigger, VideoMetadata, VideoReference},
    monitoring::{StatsBoard, StatsDisplay, StatsPoller},
    notifications::{Notification, Severity, StatusPresenter},
    orchestrator::{DownloadOrchestrator, DownloadOutcome, QuickFetchOutcome},
};

pub use crate::utils::validation::is_youtube_url;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared between commands
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<tokio::sync::RwLock<AppConfig>>,
    pub orchestrator: Arc<DownloadOrchestrator>,
    pub stats_poller: Arc<StatsPoller>,
    config_path: PathBuf,
}

impl AppState {
    /// Build state from the platform config file
    pub fn new() -> anyhow::Result<Self> {
        Self::load(None)
    }

    /// Build state from `config_path`, or the platform config file when `None`
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_config(AppConfig::load_or_default(config_path), config_path)
    }

    /// Build state from an already loaded configuration. `config_path` is where
    /// later changes are persisted, the platform config file when `None`.
    pub fn from_config(config: AppConfig, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::get_config_path()?,
        };

        let backend = HttpBackend::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;

        Ok(Self::with_backend(config, Arc::new(backend), config_path))
    }

    /// Wire the components around an arbitrary backend
    pub fn with_backend(
        config: AppConfig,
        backend: Arc<dyn Backend>,
        config_path: PathBuf,
    ) -> Self {
        let presenter = Arc::new(StatusPresenter::new(chrono::Duration::seconds(
            config.notifications.lifetime_seconds as i64,
        )));
        let orchestrator = Arc::new(DownloadOrchestrator::new(backend.clone(), presenter));
        let stats_poller = StatsPoller::new(
            backend,
            Arc::new(StatsBoard::new()),
            Duration::from_secs(config.polling.stats_interval_seconds),
        );

        Self {
            config: Arc::new(tokio::sync::RwLock::new(config)),
            orchestrator,
            stats_poller: Arc::new(stats_poller),
            config_path,
        }
    }

    pub fn presenter(&self) -> &Arc<StatusPresenter> {
        self.orchestrator.presenter()
    }

    /// File the configuration is persisted to
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing("info");
    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
    }

    #[tokio::test]
    async fn test_state_follows_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.notifications.lifetime_seconds = 9;
        config.save_to(&path).unwrap();

        let state = AppState::load(Some(&path)).unwrap();

        assert_eq!(state.config_path(), path.as_path());
        assert_eq!(state.presenter().lifetime(), chrono::Duration::seconds(9));
        assert_eq!(state.config.read().await.notifications.lifetime_seconds, 9);
        assert!(!state.stats_poller.is_running());
    }

    #[test]
    fn test_from_config_uses_given_config_without_reading_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.notifications.lifetime_seconds = 7;

        let state = AppState::from_config(config, Some(&path)).unwrap();

        assert!(!path.exists());
        assert_eq!(state.presenter().lifetime(), chrono::Duration::seconds(7));
    }
}
