//! [`StuckDetector`] – oscillating-motion deadlock detector.
//!
//! A robot caught between two obstacles tends to ping-pong: turn left away
//! from one, turn right away from the other, forever.  Each navigation loop
//! records the class of its last steering action here and asks the detector
//! whether the recent history is that oscillation.
//!
//! # Pattern
//!
//! The detector keeps the last four [`MovementCode`]s.  With a full window
//! `[m1, m2, m3, m4]` it flags a stuck condition when
//!
//! ```text
//! m1 + m2 == 1  ∧  m3 + m4 == 1  ∧  m1 == m3  ∧  m2 == m4
//! ```
//!
//! i.e. a left/right turn pair (in either order; only opposite turns sum
//! to 1) repeated exactly, in the same order.  A positive detection consumes
//! the window so the same four entries cannot re-trigger; the caller is
//! expected to break the oscillation with a large escape turn.

use std::collections::VecDeque;

use trundle_types::MovementCode;

/// Window length of the oscillation pattern.
const WINDOW: usize = 4;

/// Fixed-capacity sliding window of recent steering actions.
///
/// Owned by a single behavior task; a mode switch replaces the task and with
/// it the detector, so the window never leaks across behaviors.
#[derive(Default)]
pub struct StuckDetector {
    window: VecDeque<MovementCode>,
}

impl StuckDetector {
    /// Create a detector with an empty window.
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW),
        }
    }

    /// Record the class of the latest steering action, evicting the oldest
    /// entry when the window is full.  There is no error path.
    pub fn record(&mut self, code: MovementCode) {
        if self.window.len() == WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(code);
    }

    /// Test the window for the repeated-opposite-turns pattern.
    ///
    /// Returns `true` and clears the window on a match; returns `false` and
    /// leaves the window untouched otherwise.  A partially filled window
    /// never matches.
    pub fn check(&mut self) -> bool {
        if self.window.len() < WINDOW {
            return false;
        }
        let m1 = self.window[0].code();
        let m2 = self.window[1].code();
        let m3 = self.window[2].code();
        let m4 = self.window[3].code();

        if m1 + m2 == 1 && m3 + m4 == 1 && m1 == m3 && m2 == m4 {
            self.window.clear();
            return true;
        }
        false
    }

    /// Drop all recorded history.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Number of entries currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// `true` when no actions have been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MovementCode::{Backward, Forward, TurnLeft, TurnRight};

    #[test]
    fn repeated_left_right_pair_is_stuck() {
        let mut detector = StuckDetector::new();
        for code in [TurnLeft, TurnRight, TurnLeft, TurnRight] {
            detector.record(code);
        }
        assert!(detector.check());
    }

    #[test]
    fn repeated_right_left_pair_is_stuck() {
        let mut detector = StuckDetector::new();
        for code in [TurnRight, TurnLeft, TurnRight, TurnLeft] {
            detector.record(code);
        }
        assert!(detector.check());
    }

    #[test]
    fn positive_detection_consumes_the_window() {
        let mut detector = StuckDetector::new();
        for code in [TurnLeft, TurnRight, TurnLeft, TurnRight] {
            detector.record(code);
        }
        assert!(detector.check());
        assert!(detector.is_empty());
        // The same four entries cannot re-trigger.
        assert!(!detector.check());
    }

    #[test]
    fn mismatched_pair_order_is_not_stuck() {
        let mut detector = StuckDetector::new();
        // Both pairs sum to 1 but the order flips between them.
        for code in [TurnLeft, TurnRight, TurnRight, TurnLeft] {
            detector.record(code);
        }
        assert!(!detector.check());
        assert_eq!(detector.len(), 4);
    }

    #[test]
    fn straight_motion_is_not_stuck() {
        let mut detector = StuckDetector::new();
        for code in [Forward, Forward, Forward, Forward] {
            detector.record(code);
        }
        assert!(!detector.check());
    }

    #[test]
    fn backward_breaks_the_pattern() {
        let mut detector = StuckDetector::new();
        for code in [TurnLeft, TurnRight, Backward, TurnRight] {
            detector.record(code);
        }
        assert!(!detector.check());
    }

    #[test]
    fn partial_window_never_matches() {
        let mut detector = StuckDetector::new();
        detector.record(TurnLeft);
        detector.record(TurnRight);
        detector.record(TurnLeft);
        assert!(!detector.check());
        assert_eq!(detector.len(), 3);
    }

    #[test]
    fn window_evicts_fifo_on_overflow() {
        let mut detector = StuckDetector::new();
        // A forward entry keeps the first window from matching …
        for code in [Forward, TurnLeft, TurnRight, TurnLeft] {
            detector.record(code);
        }
        assert!(!detector.check());
        // … but one more turn slides it out and completes the pattern.
        detector.record(TurnRight);
        assert!(detector.check());
    }

    #[test]
    fn reset_clears_history() {
        let mut detector = StuckDetector::new();
        for code in [TurnLeft, TurnRight, TurnLeft] {
            detector.record(code);
        }
        detector.reset();
        assert!(detector.is_empty());
        detector.record(TurnRight);
        assert!(!detector.check());
    }
}
