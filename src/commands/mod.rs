//! Command handlers
//!
//! Thin binding layer over the core: every command takes the shared
//! [`AppState`](crate::AppState), logs its outcome and returns a
//! `Result<T, String>` a front end can render directly.

pub mod analyze;
pub mod config;
pub mod download;
pub mod notifications;
pub mod stats;
pub mod system;

// Re-export all command functions for easy access
pub use analyze::*;
pub use config::*;
pub use download::*;
pub use notifications::*;
pub use stats::*;
pub use system::*;
