//! Frame-rate gating and throughput measurement.

use std::time::{Duration, Instant};

/// Drops frames that arrive before the minimum interval has elapsed.
///
/// Only the latest posture matters, so excess frames are discarded rather
/// than queued.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl FrameGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accept the frame at `now` if the interval since the last accepted one has elapsed
    pub fn accept(&mut self, now: Instant) -> bool {
        let due = self
            .last_accepted
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_accepted = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

/// Counts processed frames over one-second windows
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_start: Option<Instant>,
    frames: u32,
    last_fps: u32,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame; returns the finished window's rate when a window rolls over
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        if now.saturating_duration_since(start) >= Self::WINDOW {
            self.last_fps = self.frames;
            self.frames = 0;
            self.window_start = Some(now);
            return Some(self.last_fps);
        }
        None
    }

    pub fn fps(&self) -> u32 {
        self.last_fps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
