//! User-facing notifications raised by the core.
//!
//! The core never shows UI; it queues `Notification`s for the host, which
//! decides how (or whether) to present them.

use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Bounded FIFO of pending notifications; the oldest are dropped first.
#[derive(Debug)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
    limit: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(32)
    }
}

impl NotificationQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.pending.len() >= self.limit {
            self.pending.remove(0);
        }
        self.pending.push(notification);
    }

    pub fn count(&self) -> usize {
        self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    /// Hand everything to the host and start over.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
