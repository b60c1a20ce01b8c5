//! Notification command handlers

use tracing::debug;
use uuid::Uuid;

use crate::core::notifications::Notification;
use crate::AppState;

/// Notifications currently on screen, oldest first
pub async fn get_notifications(state: &AppState) -> Result<Vec<Notification>, String> {
    let presenter = state.presenter();
    let pruned = presenter.prune(chrono::Utc::now());
    if pruned > 0 {
        debug!("🧹 Pruned {} finished notifications", pruned);
    }
    Ok(presenter.active())
}

/// Close a notification before its timer runs out.
/// Returns `false` when it was already gone.
pub async fn dismiss_notification(state: &AppState, id: String) -> Result<bool, String> {
    let id = Uuid::parse_str(&id).map_err(|e| format!("Invalid notification id: {}", e))?;
    Ok(state.presenter().dismiss(id))
}
