//! Session state shared between the controller and its observers.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Direction, SessionId, Timestamp};

/// Where direction samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Fed by the real pose estimator
    Live,
    /// Fed by the synthetic direction cycle
    #[default]
    Fallback,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Live => f.write_str("live"),
            SessionMode::Fallback => f.write_str("fallback"),
        }
    }
}

/// Result reported to the embedding application on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Success,
    Warning,
}

/// Counter state of one detection session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: SessionId,
    pub repetition_count: u32,
    pub required_count: u32,
    /// 100 * count / required, clamped to [0, 100]
    pub progress_percent: f64,
    pub last_direction: Direction,
    pub mode: SessionMode,
    /// Latches once `repetition_count >= required_count`
    pub completed: bool,
    pub active: bool,
    pub frames_per_second: u32,
    pub started_at: Option<Timestamp>,
}

impl SessionState {
    pub fn new(required_count: u32) -> Self {
        Self {
            session_id: SessionId::new(),
            repetition_count: 0,
            required_count,
            progress_percent: 0.0,
            last_direction: Direction::Center,
            mode: SessionMode::default(),
            completed: false,
            active: false,
            frames_per_second: 0,
            started_at: None,
        }
    }

    /// Count one repetition. Returns true when this one completes the session.
    pub fn record_repetition(&mut self) -> bool {
        self.repetition_count = self.repetition_count.saturating_add(1);
        self.progress_percent = progress(self.repetition_count, self.required_count);

        if !self.completed && self.repetition_count >= self.required_count {
            self.completed = true;
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.required_count.saturating_sub(self.repetition_count)
    }

    /// Wall time since the session started
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|t| {
                let nanos = (Timestamp::now().as_nanos() - t.as_nanos()).max(0);
                Duration::from_nanos(nanos as u64)
            })
            .unwrap_or_default()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Percentage of `required` reached by `count`, clamped to 100
pub fn progress(count: u32, required: u32) -> f64 {
    if required == 0 {
        return 100.0;
    }
    (100.0 * count as f64 / required as f64).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_latches_once() {
        let mut state = SessionState::new(2);
        assert!(!state.record_repetition());
        assert!((state.progress_percent - 50.0).abs() < 1e-9);
        assert!(state.record_repetition());
        assert!(state.completed);
        assert!(!state.record_repetition());
        assert!(state.completed);
        assert_eq!(state.repetition_count, 3);
        assert_eq!(state.progress_percent, 100.0);
    }

    #[test]
    fn test_remaining() {
        let mut state = SessionState::new(20);
        state.repetition_count = 19;
        assert_eq!(state.remaining(), 1);
        state.repetition_count = 25;
        assert_eq!(state.remaining(), 0);
    }
}
