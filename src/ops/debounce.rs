use std::time::{Duration, Instant};

/// Quiet period after a layout change before stale markers are cleared
pub const RELAYOUT_DELAY: Duration = Duration::from_millis(200);

/// Trailing-edge debouncer: fires once, `delay` after the last trigger.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            pending_since: None,
        }
    }

    /// Record an event; restarts the quiet period.
    pub fn trigger(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// True exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before `poll` would fire, if anything is pending
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending_since
            .map(|at| self.delay.saturating_sub(now.saturating_duration_since(at)))
    }
}
