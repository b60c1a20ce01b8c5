//! Status presenter
//!
//! Notifications carry an explicit expiry timestamp instead of a timer. What is
//! visible at any instant is a pure projection over the stored list, so callers
//! (and tests) decide the clock.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Default notification lifetime
pub const DEFAULT_LIFETIME_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn state_at(&self, now: DateTime<Utc>) -> NotificationState {
        match self.dismissed_at {
            Some(dismissed) if dismissed < self.expires_at => NotificationState::Dismissed,
            _ if now >= self.expires_at => NotificationState::Expired,
            Some(_) => NotificationState::Dismissed,
            None => NotificationState::Active,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == NotificationState::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationState {
    Active,
    /// Closed by the user before it expired
    Dismissed,
    /// Reached its expiry without manual dismissal
    Expired,
}

/// Side-effecting sink for user-facing status messages
#[derive(Debug)]
pub struct StatusPresenter {
    lifetime: Duration,
    entries: Mutex<Vec<Notification>>,
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_LIFETIME_SECS))
    }
}

impl StatusPresenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn show(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        self.show_at(message, severity, Utc::now())
    }

    pub fn show_at(
        &self,
        message: impl Into<String>,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: now,
            expires_at: now + self.lifetime,
            dismissed_at: None,
        };
        let id = notification.id;
        debug!(
            "[{}] {} (id: {})",
            severity.as_str(),
            notification.message,
            id
        );
        self.entries.lock().push(notification);
        id
    }

    /// Manual dismissal. False if the id is unknown or no longer active.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.dismiss_at(id, Utc::now())
    }

    pub fn dismiss_at(&self, id: Uuid, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter_mut().find(|n| n.id == id) {
            Some(notification) if notification.is_active_at(now) => {
                notification.dismissed_at = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn state_of(&self, id: Uuid, now: DateTime<Utc>) -> Option<NotificationState> {
        self.entries
            .lock()
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.state_at(now))
    }

    /// Notifications visible at `now`, oldest first
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.is_active_at(now))
            .cloned()
            .collect()
    }

    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Utc::now())
    }

    /// Every notification ever shown and not yet pruned
    pub fn history(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// Drop inactive entries, returning how many were removed
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|n| n.is_active_at(now));
        before - entries.len()
    }
}
