//! Cache statistics command handlers

use tracing::info;

use crate::core::monitoring::StatsDisplay;
use crate::AppState;

/// Fetch the statistics now, outside the polling cadence
pub async fn get_cache_stats(state: &AppState) -> Result<StatsDisplay, String> {
    // failures are logged by the poller
    state
        .stats_poller
        .poll_once()
        .await
        .map_err(|e| e.to_string())
}

/// Last values the poller stored, zeros before the first success
pub async fn get_stats_display(state: &AppState) -> Result<StatsDisplay, String> {
    Ok(state.stats_poller.board().display())
}

pub async fn start_stats_polling(state: &AppState) -> Result<(), String> {
    if !state.config.read().await.polling.enabled {
        info!("📊 Stats polling disabled by configuration");
        return Ok(());
    }

    state.stats_poller.start();
    Ok(())
}

pub async fn stop_stats_polling(state: &AppState) -> Result<(), String> {
    state.stats_poller.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockBackend;
    use crate::AppConfig;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_stats_commands() {
        let backend = Arc::new(MockBackend::new());
        backend.push_stats_json(json!({
            "cache": {"hit_rate": 25.5, "total_requests": 8},
            "total_cached_videos": 2
        }));
        let state =
            AppState::with_backend(AppConfig::default(), backend.clone(), PathBuf::from("x.json"));

        assert_eq!(get_stats_display(&state).await.unwrap().hit_rate, "0%");

        let display = get_cache_stats(&state).await.unwrap();
        assert_eq!(display.hit_rate, "25.5%");
        assert_eq!(get_stats_display(&state).await.unwrap(), display);

        assert!(get_cache_stats(&state).await.is_err());
        assert_eq!(get_stats_display(&state).await.unwrap(), display);
        assert!(state.presenter().history().is_empty());
    }

    #[tokio::test]
    async fn test_polling_respects_config_switch() {
        let mut config = AppConfig::default();
        config.polling.enabled = false;
        let state =
            AppState::with_backend(config, Arc::new(MockBackend::new()), PathBuf::from("x.json"));

        start_stats_polling(&state).await.unwrap();
        assert!(!state.stats_poller.is_running());

        state.config.write().await.polling.enabled = true;
        start_stats_polling(&state).await.unwrap();
        assert!(state.stats_poller.is_running());

        stop_stats_polling(&state).await.unwrap();
        assert!(!state.stats_poller.is_running());
    }

    #[tokio::test]
    async fn test_pending_refresh_does_not_block_other_commands() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(MockBackend::with_stats_gate(gate.clone()));
        backend.push_stats_json(json!({"cache": {"total_requests": 5}}));
        let state =
            AppState::with_backend(AppConfig::default(), backend.clone(), PathBuf::from("x.json"));

        let pending = {
            let state = state.clone();
            tokio::spawn(async move { get_cache_stats(&state).await })
        };
        while *backend.stats_calls.lock() == 0 {
            tokio::task::yield_now().await;
        }

        let display = tokio::time::timeout(Duration::from_secs(1), get_stats_display(&state))
            .await
            .expect("display answers while a refresh is pending")
            .unwrap();
        assert_eq!(display.total_requests, "0");
        tokio::time::timeout(Duration::from_secs(1), stop_stats_polling(&state))
            .await
            .expect("stop answers while a refresh is pending")
            .unwrap();

        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap().total_requests, "5");
        assert_eq!(get_stats_display(&state).await.unwrap().total_requests, "5");
    }
}
