//! Download command handlers

use tracing::info;

use crate::core::models::DownloadKind;
use crate::core::orchestrator::DownloadOutcome;
use crate::AppState;

/// Request a download link for the analyzed video.
/// `kind` is `"video"` or `"audio"`.
pub async fn download_content(state: &AppState, kind: String) -> Result<DownloadOutcome, String> {
    let kind: DownloadKind = kind.parse()?;
    download_impl(state, kind).await
}

pub async fn download_video(state: &AppState) -> Result<DownloadOutcome, String> {
    download_impl(state, DownloadKind::Video).await
}

pub async fn download_audio(state: &AppState) -> Result<DownloadOutcome, String> {
    download_impl(state, DownloadKind::Audio).await
}

async fn download_impl(state: &AppState, kind: DownloadKind) -> Result<DownloadOutcome, String> {
    info!("📥 Requesting {} download link", kind);

    match state.orchestrator.download(kind).await {
        Ok(outcome) => {
            info!("✅ {} -> {}", outcome.status_line, outcome.trigger.url);
            Ok(outcome)
        }
        // logged by the orchestrator at the level its category calls for
        Err(e) => Err(e.user_message()),
    }
}
