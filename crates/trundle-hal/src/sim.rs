//! In-process simulated drivers for headless testing.
//!
//! Every trait seam in this crate has a scripted stand-in here so the full
//! behavior stack can run in CI and in the CLI's sim mode without a chassis,
//! a sensor ring, or a camera attached.  The motor double records every
//! command so tests can assert on the exact pulse sequence a control loop
//! produced.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::trace;
use trundle_types::{Bearing, DistanceSample, ObjectObservation, TrundleError};

use crate::motor::{MotorCommand, MotorDriver};
use crate::range::RangeArray;
use crate::speech::Announcer;
use crate::vision::Vision;

// ────────────────────────────────────────────────────────────────────────────
// Motor double
// ────────────────────────────────────────────────────────────────────────────

/// A motor driver that records every command it receives.  Always succeeds.
#[derive(Default)]
pub struct SimMotor {
    seen: Mutex<Vec<MotorCommand>>,
}

impl SimMotor {
    /// Create a motor double with an empty command log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far, in order.
    pub fn commands(&self) -> Vec<MotorCommand> {
        self.seen.lock().unwrap().clone()
    }

    /// The most recent command, if any.
    pub fn last(&self) -> Option<MotorCommand> {
        self.seen.lock().unwrap().last().copied()
    }

    /// How many times `cmd` was received.
    pub fn count_of(&self, cmd: MotorCommand) -> usize {
        self.seen.lock().unwrap().iter().filter(|c| **c == cmd).count()
    }

    /// Forget the log.  Useful between test phases.
    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }

    fn record(&self, cmd: MotorCommand) {
        trace!(%cmd, "sim motor");
        self.seen.lock().unwrap().push(cmd);
    }
}

impl MotorDriver for SimMotor {
    fn forward(&self) {
        self.record(MotorCommand::Forward);
    }

    fn backward(&self) {
        self.record(MotorCommand::Backward);
    }

    fn turn_left(&self) {
        self.record(MotorCommand::TurnLeft);
    }

    fn turn_right(&self) {
        self.record(MotorCommand::TurnRight);
    }

    fn stop(&self) {
        self.record(MotorCommand::Stop);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Range double
// ────────────────────────────────────────────────────────────────────────────

/// A range array that replays a scripted sequence of samples.
///
/// Once only one sample remains it is returned for every subsequent poll, so
/// a script's final entry describes the world "from now on".  An empty script
/// reports [`DistanceSample::no_echo`] forever.
pub struct ScriptedRangeArray {
    script: Mutex<VecDeque<DistanceSample>>,
}

impl ScriptedRangeArray {
    /// Create a scripted range array from `samples`, replayed in order.
    pub fn new(samples: impl IntoIterator<Item = DistanceSample>) -> Self {
        Self {
            script: Mutex::new(samples.into_iter().collect()),
        }
    }

    /// A range array that always reports the same `sample`.
    pub fn steady(sample: DistanceSample) -> Self {
        Self::new([sample])
    }
}

#[async_trait]
impl RangeArray for ScriptedRangeArray {
    async fn read_distances(&self) -> Result<DistanceSample, TrundleError> {
        let mut script = self.script.lock().unwrap();
        let sample = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().copied().unwrap_or_else(DistanceSample::no_echo)
        };
        Ok(sample)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vision double
// ────────────────────────────────────────────────────────────────────────────

/// A vision pipeline that replays scripted detection frames and track fixes.
///
/// The detect script and the track script advance independently.  Like
/// [`ScriptedRangeArray`], each script holds its last entry once reached; an
/// exhausted (never-filled) detect script yields empty frames and an empty
/// track script reports the target as not visible.
#[derive(Default)]
pub struct ScriptedVision {
    frames: Mutex<VecDeque<Vec<ObjectObservation>>>,
    fixes: Mutex<VecDeque<Option<(Bearing, f32)>>>,
}

impl ScriptedVision {
    /// Create a vision double with empty scripts (sees nothing, forever).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue detection frames, each a full per-frame observation list.
    pub fn with_frames(
        self,
        frames: impl IntoIterator<Item = Vec<ObjectObservation>>,
    ) -> Self {
        self.frames.lock().unwrap().extend(frames);
        self
    }

    /// Queue track fixes: `Some((bearing, area))` or `None` for not visible.
    pub fn with_fixes(
        self,
        fixes: impl IntoIterator<Item = Option<(Bearing, f32)>>,
    ) -> Self {
        self.fixes.lock().unwrap().extend(fixes);
        self
    }

    /// Shorthand for a single-observation frame.
    pub fn observation(name: &str, bearing: Option<Bearing>) -> ObjectObservation {
        ObjectObservation {
            name: name.to_string(),
            bearing,
            area: 1000.0,
            confidence: 0.9,
        }
    }

    fn advance<T: Clone>(script: &Mutex<VecDeque<T>>, empty: T) -> T {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(empty)
        }
    }
}

#[async_trait]
impl Vision for ScriptedVision {
    async fn detect(&self) -> Result<Vec<ObjectObservation>, TrundleError> {
        Ok(Self::advance(&self.frames, Vec::new()))
    }

    async fn track(&self, target: &str) -> Result<Option<(Bearing, f32)>, TrundleError> {
        let _ = target;
        Ok(Self::advance(&self.fixes, None))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Announcer double
// ────────────────────────────────────────────────────────────────────────────

/// An announcer that records spoken lines instead of producing audio.
#[derive(Default)]
pub struct RecordingAnnouncer {
    lines: Mutex<Vec<String>>,
}

impl RecordingAnnouncer {
    /// Create an announcer double with an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn say(&self, text: &str) {
        trace!(text, "sim announcer");
        self.lines.lock().unwrap().push(text.to_string());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use trundle_types::NO_ECHO;

    #[test]
    fn sim_motor_records_in_order() {
        let motor = SimMotor::new();
        motor.forward();
        motor.stop();
        motor.turn_right();
        assert_eq!(
            motor.commands(),
            vec![
                MotorCommand::Forward,
                MotorCommand::Stop,
                MotorCommand::TurnRight
            ]
        );
        assert_eq!(motor.last(), Some(MotorCommand::TurnRight));
        assert_eq!(motor.count_of(MotorCommand::Stop), 1);
    }

    #[tokio::test]
    async fn scripted_range_holds_final_sample() {
        let near = DistanceSample {
            front: 10.0,
            left: 50.0,
            right: 50.0,
            back: 50.0,
        };
        let far = DistanceSample {
            front: 90.0,
            left: 50.0,
            right: 50.0,
            back: 50.0,
        };
        let range = ScriptedRangeArray::new([near, far]);
        assert_eq!(range.read_distances().await.unwrap(), near);
        assert_eq!(range.read_distances().await.unwrap(), far);
        // Final entry repeats.
        assert_eq!(range.read_distances().await.unwrap(), far);
    }

    #[tokio::test]
    async fn empty_range_script_reports_no_echo() {
        let range = ScriptedRangeArray::new([]);
        let sample = range.read_distances().await.unwrap();
        assert_eq!(sample.front, NO_ECHO);
        assert_eq!(sample.back, NO_ECHO);
    }

    #[tokio::test]
    async fn scripted_vision_advances_frames_then_holds() {
        let bottle = ScriptedVision::observation("bottle", None);
        let vision = ScriptedVision::new().with_frames([vec![], vec![bottle.clone()]]);
        assert!(vision.detect().await.unwrap().is_empty());
        assert_eq!(vision.detect().await.unwrap(), vec![bottle.clone()]);
        assert_eq!(vision.detect().await.unwrap(), vec![bottle]);
    }

    #[tokio::test]
    async fn scripted_vision_track_fixes_advance_independently() {
        let vision = ScriptedVision::new()
            .with_fixes([None, Some((Bearing::Left, 900.0)), Some((Bearing::Center, 1500.0))]);
        assert_eq!(vision.track("person").await.unwrap(), None);
        assert_eq!(
            vision.track("person").await.unwrap(),
            Some((Bearing::Left, 900.0))
        );
        assert_eq!(
            vision.track("person").await.unwrap(),
            Some((Bearing::Center, 1500.0))
        );
        // Held fix.
        assert_eq!(
            vision.track("person").await.unwrap(),
            Some((Bearing::Center, 1500.0))
        );
    }

    #[tokio::test]
    async fn recording_announcer_keeps_transcript() {
        let announcer = RecordingAnnouncer::new();
        announcer.say("I am following you").await;
        announcer.say("now available").await;
        assert_eq!(
            announcer.transcript(),
            vec!["I am following you", "now available"]
        );
    }
}
