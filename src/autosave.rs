//! Debounced autosave timer.
//!
//! Every mutation pushes the deadline back; the write happens once the
//! scene has been quiet for the full delay. The timer only decides *when*;
//! the workspace performs the write.

use crate::constants::AUTOSAVE_DEBOUNCE_MS;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct AutosaveDebouncer {
    delay: Duration,
    due: Option<Instant>,
}

impl Default for AutosaveDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(AUTOSAVE_DEBOUNCE_MS))
    }
}

impl AutosaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// (Re)start the countdown from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Consume a pending save immediately. Returns true if one was pending.
    pub fn flush(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}
