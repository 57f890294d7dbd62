//! Stalled-session detection.

use std::time::{Duration, Instant};

/// Reports when frames stop arriving for longer than `timeout`.
///
/// A stall is reported once; the watchdog re-arms on the next frame.
#[derive(Debug, Clone)]
pub struct StallWatchdog {
    timeout: Duration,
    last_seen: Option<Instant>,
    reported: bool,
}

impl StallWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_seen: None,
            reported: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start watching from `now`
    pub fn arm(&mut self, now: Instant) {
        self.last_seen = Some(now);
        self.reported = false;
    }

    /// Record frame activity at `now`
    pub fn feed(&mut self, now: Instant) {
        self.arm(now);
    }

    pub fn disarm(&mut self) {
        self.last_seen = None;
        self.reported = false;
    }

    /// Silence duration if the session just crossed the timeout
    pub fn check(&mut self, now: Instant) -> Option<Duration> {
        let last = self.last_seen?;
        let silent_for = now.saturating_duration_since(last);
        if silent_for >= self.timeout && !self.reported {
            self.reported = true;
            return Some(silent_for);
        }
        None
    }

    /// When the next stall would be reported, if any
    pub fn deadline(&self) -> Option<Instant> {
        if self.reported {
            return None;
        }
        self.last_seen.map(|last| last + self.timeout)
    }
}
