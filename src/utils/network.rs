//! Network utilities and helpers

use std::time::Duration;

/// Timeout for the reachability probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Get user agent string
pub fn get_user_agent() -> String {
    format!("Ytmp4Client/{}", env!("CARGO_PKG_VERSION"))
}

/// Check whether the backend answers HTTP at all. Any status counts as reachable.
pub async fn check_connectivity(url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(PROBE_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::debug!("Failed to build probe client: {}", err);
            return false;
        }
    };

    match client.get(url).send().await {
        Ok(response) => {
            tracing::debug!("Backend {} answered {}", url, response.status());
            true
        }
        Err(err) => {
            tracing::debug!("Backend {} unreachable: {}", url, err);
            false
        }
    }
}
