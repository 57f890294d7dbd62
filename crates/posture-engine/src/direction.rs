//! Direction state machine.
//!
//! A repetition is counted only when the head returns to center from a
//! turned position. Turning out (Center→Left, Center→Right) and swapping
//! sides (Left↔Right) change the tracked direction without counting, so one
//! full "turn out and back" is needed per repetition. Repeated samples of the
//! same direction are no-ops.

use posture_core::Direction;
use serde::{Deserialize, Serialize};

/// Transition observed between two consecutive direction samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionEvent {
    /// Moved to a non-center direction
    Turned { from: Direction, to: Direction },
    /// Came back to center from a turn; counts as one repetition
    ReturnedToCenter { from: Direction },
}

impl DirectionEvent {
    pub fn counts_repetition(&self) -> bool {
        matches!(self, DirectionEvent::ReturnedToCenter { .. })
    }

    /// Direction after the transition
    pub fn direction(&self) -> Direction {
        match self {
            DirectionEvent::Turned { to, .. } => *to,
            DirectionEvent::ReturnedToCenter { .. } => Direction::Center,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectionTracker {
    last_direction: Direction,
}

impl DirectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Fold one direction sample into the tracker
    pub fn observe(&mut self, current: Direction) -> Option<DirectionEvent> {
        let from = self.last_direction;
        if current == from {
            return None;
        }
        self.last_direction = current;

        Some(if current.is_center() {
            DirectionEvent::ReturnedToCenter { from }
        } else {
            DirectionEvent::Turned { from, to: current }
        })
    }

    pub fn reset(&mut self) {
        self.last_direction = Direction::Center;
    }
}
