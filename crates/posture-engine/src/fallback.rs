//! Synthetic direction cycle used when no pose estimator is available.

use posture_core::Direction;

const CYCLE: [Direction; 4] = [
    Direction::Center,
    Direction::Left,
    Direction::Center,
    Direction::Right,
];

/// Endless `Center → Left → Center → Right` sequence
#[derive(Debug, Clone, Default)]
pub struct FallbackCycle {
    phase: usize,
}

impl FallbackCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Next direction in the cycle
    pub fn advance(&mut self) -> Direction {
        let direction = CYCLE[self.phase];
        self.phase = (self.phase + 1) % CYCLE.len();
        direction
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}

impl Iterator for FallbackCycle {
    type Item = Direction;

    fn next(&mut self) -> Option<Direction> {
        Some(self.advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::DirectionTracker;

    #[test]
    fn test_cycle_order() {
        let seq: Vec<Direction> = FallbackCycle::new().take(6).collect();
        assert_eq!(
            seq,
            vec![
                Direction::Center,
                Direction::Left,
                Direction::Center,
                Direction::Right,
                Direction::Center,
                Direction::Left,
            ]
        );
    }

    #[test]
    fn test_cycle_reaches_twenty_after_twenty_returns() {
        let mut tracker = DirectionTracker::new();
        let mut count = 0;
        let mut returns = 0;
        let mut ticks = 0;

        for direction in FallbackCycle::new() {
            ticks += 1;
            if direction == Direction::Center && ticks > 1 {
                returns += 1;
            }
            if let Some(event) = tracker.observe(direction) {
                if event.counts_repetition() {
                    count += 1;
                }
            }
            if count == 20 {
                break;
            }
        }

        assert_eq!(count, 20);
        assert_eq!(returns, 20);
        // Initial Center plus 20 turn-and-return pairs
        assert_eq!(ticks, 41);
    }
}
