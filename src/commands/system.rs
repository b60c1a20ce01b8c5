//! System command handlers

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::network::check_connectivity;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub backend_url: String,
    pub config_path: String,
}

pub async fn get_app_info(state: &AppState) -> Result<AppInfo, String> {
    Ok(AppInfo {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        backend_url: state.config.read().await.backend.base_url.clone(),
        config_path: state.config_path().display().to_string(),
    })
}

/// Whether the configured backend answers at all
pub async fn check_backend(state: &AppState) -> Result<bool, String> {
    let base_url = state.config.read().await.backend.base_url.clone();
    let reachable = check_connectivity(&base_url).await;
    info!(
        "🌐 Backend {} is {}",
        base_url,
        if reachable { "reachable" } else { "unreachable" }
    );
    Ok(reachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockBackend;
    use crate::AppConfig;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_app_info_reports_backend() {
        let mut config = AppConfig::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        let state =
            AppState::with_backend(config, Arc::new(MockBackend::new()), PathBuf::from("c.json"));

        let info = get_app_info(&state).await.unwrap();
        assert_eq!(info.name, "ytmp4-client");
        assert_eq!(info.backend_url, "http://127.0.0.1:9");
        assert_eq!(info.config_path, "c.json");

        assert!(!check_backend(&state).await.unwrap());
    }
}
