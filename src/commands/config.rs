//! Configuration command handlers
//!
//! Changes are persisted immediately. Backend and polling settings take
//! effect on the next start.

use tracing::{error, info};

use crate::core::AppConfig;
use crate::AppState;

/// Get current application configuration
pub async fn get_config(state: &AppState) -> Result<AppConfig, String> {
    info!("⚙️ Getting application configuration");

    let config = state.config.read().await;
    Ok(config.clone())
}

/// Validate, store and persist a new configuration
pub async fn update_config(state: &AppState, new_config: AppConfig) -> Result<(), String> {
    info!("🔧 Updating application configuration");

    match update_config_impl(state, new_config).await {
        Ok(()) => {
            info!("✅ Configuration updated successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Failed to update configuration: {:#}", e);
            Err(e.to_string())
        }
    }
}

/// Reset configuration to default values
pub async fn reset_config(state: &AppState) -> Result<AppConfig, String> {
    info!("🔄 Resetting configuration to defaults");

    match update_config_impl(state, AppConfig::default()).await {
        Ok(()) => {
            info!("✅ Configuration reset successfully");
            Ok(AppConfig::default())
        }
        Err(e) => {
            error!("❌ Failed to reset configuration: {:#}", e);
            Err(e.to_string())
        }
    }
}

/// Export configuration to file
pub async fn export_config(state: &AppState, file_path: String) -> Result<(), String> {
    info!("💾 Exporting configuration to: {}", file_path);

    let json = state
        .config
        .read()
        .await
        .export()
        .map_err(|e| e.to_string())?;

    tokio::fs::write(&file_path, json).await.map_err(|e| {
        error!("❌ Failed to export configuration: {}", e);
        e.to_string()
    })
}

/// Import configuration from file
pub async fn import_config(state: &AppState, file_path: String) -> Result<AppConfig, String> {
    info!("📂 Importing configuration from: {}", file_path);

    let content = tokio::fs::read_to_string(&file_path)
        .await
        .map_err(|e| format!("Configuration file not readable: {}: {}", file_path, e))?;

    let imported = AppConfig::import(&content).map_err(|e| {
        error!("❌ Failed to import configuration: {:#}", e);
        format!("{:#}", e)
    })?;

    update_config(state, imported.clone()).await?;
    Ok(imported)
}

pub async fn get_config_path(state: &AppState) -> Result<String, String> {
    Ok(state.config_path().display().to_string())
}

async fn update_config_impl(state: &AppState, new_config: AppConfig) -> anyhow::Result<()> {
    new_config.validate()?;
    new_config.save_to(state.config_path())?;

    *state.config.write().await = new_config;
    Ok(())
}
