//! Error taxonomy for the download orchestrator
//!
//! Every failure the orchestrator can hit falls into one of four categories.
//! The category decides how the failure is presented and logged:
//! - Input validation: caught before any network call, shown as a warning, not logged
//! - Application: the backend answered `status: false`, shown verbatim or with a fallback
//! - Transport: network failure or unusable response, logged and shown generically
//! - Background: stats polling failures, logged only
//!
//! Nothing is retried automatically. The user resubmits, or the poller's next tick runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::core::models::{DownloadKind, TransportError};
use crate::core::notifications::Severity;

pub const EMPTY_URL_MESSAGE: &str = "Please enter a YouTube URL";
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid YouTube URL";
pub const NOT_ANALYZED_MESSAGE: &str = "Please analyze a video first";
pub const ANALYZE_FALLBACK_MESSAGE: &str = "Failed to analyze video";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Error categories, in the order a request can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Rejected locally before any request was issued
    InputValidation,
    /// Backend responded with `status: false`
    Application,
    /// Network failure or unparsable response
    Transport,
    /// Stats polling failure, never user-visible
    Background,
}

impl ErrorCategory {
    /// Notification severity, `None` for silent categories
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::InputValidation => Some(Severity::Warning),
            Self::Application | Self::Transport => Some(Severity::Danger),
            Self::Background => None,
        }
    }

    pub fn is_user_visible(&self) -> bool {
        self.severity().is_some()
    }
}

/// Errors returned by orchestrator commands
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", EMPTY_URL_MESSAGE)]
    EmptyUrl,

    #[error("{}", INVALID_URL_MESSAGE)]
    InvalidUrl,

    #[error("{}", NOT_ANALYZED_MESSAGE)]
    NotAnalyzed,

    /// Resolved message: server-supplied when present, fallback otherwise
    #[error("{message}")]
    Rejected { message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyUrl | Self::InvalidUrl | Self::NotAnalyzed => ErrorCategory::InputValidation,
            Self::Rejected { .. } => ErrorCategory::Application,
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }

    /// Text shown to the user. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Build an application error from an optional server message.
    /// Empty server messages count as absent.
    pub fn rejected(message: Option<String>, fallback: impl Into<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.into());
        Self::Rejected { message }
    }

    /// Log according to category. Validation errors are routine and stay silent.
    pub fn log(&self, operation: &str) {
        match self.category() {
            ErrorCategory::InputValidation => {}
            ErrorCategory::Application => info!("{} rejected by backend: {}", operation, self),
            ErrorCategory::Transport => error!("{} error: {}", operation, self),
            ErrorCategory::Background => warn!("{} failed: {}", operation, self),
        }
    }
}

/// Fallback for a download rejected without a message
pub fn download_fallback_message(kind: DownloadKind) -> String {
    format!("Failed to get {} download link", kind)
}

/// Result type alias for orchestrator operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_severity_mapping() {
        assert_eq!(
            ErrorCategory::InputValidation.severity(),
            Some(Severity::Warning)
        );
        assert_eq!(ErrorCategory::Application.severity(), Some(Severity::Danger));
        assert_eq!(ErrorCategory::Transport.severity(), Some(Severity::Danger));
        assert!(!ErrorCategory::Background.is_user_visible());
    }

    #[test]
    fn test_rejected_prefers_server_message() {
        let err = ClientError::rejected(Some("Video unavailable".into()), ANALYZE_FALLBACK_MESSAGE);
        assert_eq!(err.user_message(), "Video unavailable");
        assert_eq!(err.category(), ErrorCategory::Application);
    }

    #[test]
    fn test_rejected_falls_back_on_missing_or_empty_message() {
        let err = ClientError::rejected(None, ANALYZE_FALLBACK_MESSAGE);
        assert_eq!(err.user_message(), ANALYZE_FALLBACK_MESSAGE);

        let err = ClientError::rejected(
            Some(String::new()),
            download_fallback_message(DownloadKind::Audio),
        );
        assert_eq!(err.user_message(), "Failed to get audio download link");
    }

    #[test]
    fn test_transport_errors_hide_details() {
        let err = ClientError::from(TransportError::Unreachable("connection refused".into()));
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ClientError::EmptyUrl.user_message(), EMPTY_URL_MESSAGE);
        assert_eq!(ClientError::InvalidUrl.user_message(), INVALID_URL_MESSAGE);
        assert_eq!(ClientError::NotAnalyzed.user_message(), NOT_ANALYZED_MESSAGE);
        assert_eq!(
            ClientError::NotAnalyzed.category(),
            ErrorCategory::InputValidation
        );
    }
}
