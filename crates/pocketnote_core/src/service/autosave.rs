//! Debounce timer for content-edit persistence.
//!
//! The timer is plain state polled by its owner; nothing runs in the
//! background.
//!
//! # Invariants
//! - At most one deadline is armed at a time; re-arming replaces it.
//! - The deadline stays armed until the owner cancels or re-arms it.

use std::time::{Duration, Instant};

/// Quiet period before a pending content edit is written.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Restartable single-deadline debounce timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Cancels any pending deadline and arms a new one at `now + window`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether an armed deadline has been reached at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DEBOUNCE)
    }
}
