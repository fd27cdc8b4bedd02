//! Notifications: round announcements and scheduler events.
//! No queues. Notifications are kept in a small in-memory history and
//! dispatched directly.

use serde::{Deserialize, Serialize};

/// Entries kept in the router history.
const HISTORY_LIMIT: usize = 100;

/// A notification about a community event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub priority: NotifyPriority,
    /// What produced it ("scheduler", "round", ...).
    pub source: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Notification priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotifyPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Keeps the last notifications that were raised.
#[derive(Debug, Default)]
pub struct NotifyRouter {
    history: Vec<Notification>,
}

impl NotifyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification in history.
    pub fn record(&mut self, notification: Notification) {
        self.history.push(notification);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }

    pub fn history(&self) -> &[Notification] {
        &self.history
    }

    /// Create a notification stamped with the current time.
    pub fn create(title: &str, body: &str, source: &str, priority: NotifyPriority) -> Notification {
        Notification {
            title: title.to_string(),
            body: body.to_string(),
            priority,
            source: source.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}
