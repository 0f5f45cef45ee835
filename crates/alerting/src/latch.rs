//! Alert Latch Implementation

use std::time::{Duration, Instant};
use tracing::debug;

/// Default time an alert stays raised after the last trigger
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(3);

/// Debounced alert flag
///
/// Raised by [`trigger`](Self::trigger), lowered by
/// [`release`](Self::release) only once more than `clear_after` has passed
/// since the most recent trigger.
#[derive(Debug, Clone)]
pub struct AlertLatch {
    clear_after: Duration,
    active: bool,
    last_triggered: Option<Instant>,
}

impl AlertLatch {
    /// Create a latch with the given clear window
    pub fn new(clear_after: Duration) -> Self {
        Self {
            clear_after,
            active: false,
            last_triggered: None,
        }
    }

    /// Raise the alert and restart the clear window
    pub fn trigger(&mut self, now: Instant) {
        if !self.active {
            debug!("Alert raised");
        }
        self.active = true;
        self.last_triggered = Some(now);
    }

    /// Lower the alert if the clear window has elapsed; returns the flag
    pub fn release(&mut self, now: Instant) -> bool {
        let expired = match self.last_triggered {
            Some(at) => now.saturating_duration_since(at) > self.clear_after,
            None => true,
        };
        if self.active && expired {
            debug!("Alert cleared");
            self.active = false;
        }
        self.active
    }

    /// Whether the alert is raised
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time of the most recent trigger
    pub fn last_triggered(&self) -> Option<Instant> {
        self.last_triggered
    }

    /// Drop the alert without waiting
    pub fn reset(&mut self) {
        self.active = false;
    }
}

impl Default for AlertLatch {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_waits_for_window() {
        let t0 = Instant::now();
        let mut latch = AlertLatch::default();
        latch.trigger(t0);

        assert!(latch.release(t0 + Duration::from_secs(1)));
        assert!(latch.release(t0 + Duration::from_secs(3)));
        assert!(!latch.release(t0 + Duration::from_millis(3001)));
    }

    #[test]
    fn test_retrigger_extends_window() {
        let t0 = Instant::now();
        let mut latch = AlertLatch::default();
        latch.trigger(t0);
        latch.trigger(t0 + Duration::from_secs(2));

        assert!(latch.release(t0 + Duration::from_secs(4)));
        assert!(!latch.release(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_release_without_trigger_is_noop() {
        let mut latch = AlertLatch::default();
        assert!(!latch.release(Instant::now()));
        assert_eq!(latch.last_triggered(), None);
    }

    #[test]
    fn test_reset_keeps_timestamp() {
        let t0 = Instant::now();
        let mut latch = AlertLatch::default();
        latch.trigger(t0);
        latch.reset();
        assert!(!latch.is_active());
        assert_eq!(latch.last_triggered(), Some(t0));
    }
}
