//! Core client logic
//!
//! This module contains the wire models, the backend client, the request
//! orchestrator and the background stats poller.

pub mod backend;
pub mod config;
pub mod error_handling;
pub mod models;
pub mod monitoring;
pub mod notifications;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_support;



#[cfg(test)]
mod monitoring_integration_tests;

// Re-export commonly used types
pub use backend::{Backend, HttpBackend};
pub use config::AppConfig;
pub use error_handling::{ClientError, ClientResult, ErrorCategory};
pub use monitoring::{StatsBoard, StatsDisplay, StatsPoller};
pub use notifications::{Notification, Severity, StatusPresenter};
pub use orchestrator::{DownloadOrchestrator, DownloadOutcome, QuickFetchOutcome, Session};
