//! Single-slot debounce timer.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// A restartable one-shot deadline.
///
/// Arming replaces any pending deadline, so a burst of changes inside the
/// window fires once, `window` after the last change.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the window.
    pub fn arm(&mut self, window: Duration) {
        self.deadline = Some(Instant::now() + window);
    }

    /// Drops the pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Completes when the pending deadline passes, then disarms.
    ///
    /// Never completes while disarmed. Dropping the future before it
    /// completes leaves the deadline in place.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
