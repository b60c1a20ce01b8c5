//! Analyze and quick fetch command handlers

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::models::{VideoMetadata, VideoReference};
use crate::core::orchestrator::{ControlState, QuickFetchOutcome, SessionPhase};
use crate::AppState;

/// Everything a front end needs to draw the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub controls: ControlState,
    pub reference: Option<VideoReference>,
    pub metadata: Option<VideoMetadata>,
}

/// Resolve a YouTube URL and remember it for later downloads
pub async fn analyze_video(state: &AppState, url: String) -> Result<VideoMetadata, String> {
    info!("🔍 Analyzing: {}", url);

    match state.orchestrator.analyze(&url).await {
        Ok(metadata) => {
            info!("✅ Analyzed \"{}\" ({})", metadata.title, metadata.duration);
            Ok(metadata)
        }
        // logged by the orchestrator at the level its category calls for
        Err(e) => Err(e.user_message()),
    }
}

/// One-shot metadata plus best-quality link
pub async fn quick_fetch_video(state: &AppState, url: String) -> Result<QuickFetchOutcome, String> {
    info!("⚡ Quick fetch: {}", url);

    match state.orchestrator.quick_fetch(&url).await {
        Ok(outcome) => {
            info!("✅ {}", outcome.status_line);
            Ok(outcome)
        }
        Err(e) => Err(e.user_message()),
    }
}

pub async fn get_session_state(state: &AppState) -> Result<SessionView, String> {
    let session = state.orchestrator.session();
    Ok(SessionView {
        phase: session.phase(),
        controls: session.controls(),
        reference: session.reference(),
        metadata: session.metadata(),
    })
}
