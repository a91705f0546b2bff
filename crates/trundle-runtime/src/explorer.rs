//! [`ReactiveExplorer`] – threshold-based obstacle avoidance.
//!
//! One step: read the ultrasonic ring, walk a fixed decision table top to
//! bottom, execute the first matching row as a timed pulse sequence.  No
//! map, no memory beyond the shared [`StuckDetector`] window.  The same
//! step drives free exploration (AUTONOMOUS mode) and the "can't see the
//! target, explore one step" retry inside the find behavior.
//!
//! # Decision table
//!
//! | Condition (cm; `NO_ECHO` counts as clear) | Action |
//! |---|---|
//! | stuck pattern detected | large 1s clockwise escape turn, window cleared |
//! | front blocked, both sides clear | stop, back up 0.3s, rotate right 0.5s |
//! | both sides blocked | stop, back up 0.2s if rear known-clear, rotate right 0.6s |
//! | left blocked | same as above |
//! | right blocked | mirrored: rotate left 0.6s |
//! | path clear | forward 0.3s |
//!
//! Every turn/forward row records its [`MovementCode`]; the escape row
//! records nothing (the detector consumed its window instead), and the
//! front-obstacle row is a pre-planned reverse-and-turn, not a steering
//! decision, so it records nothing either.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trundle_hal::{MotorCommand, RangeArray};
use trundle_middleware::NoticeBus;
use trundle_types::{DistanceSample, MovementCode, Notice, TrundleError};

use crate::motion::Drivetrain;
use crate::stuck::StuckDetector;

const SOURCE: &str = "trundle-runtime::explorer";

/// Obstacle threshold ahead.
const FRONT_THRESHOLD_CM: f32 = 30.0;
/// Obstacle threshold on either side.
const SIDE_THRESHOLD_CM: f32 = 30.0;
/// Minimum known rear clearance before backing up.
const REAR_CLEARANCE_CM: f32 = 15.0;

/// Settle pause after cutting the motors, before the next maneuver.
const SETTLE: Duration = Duration::from_millis(300);
/// Reverse leg of the front-obstacle maneuver.
const FRONT_BACKUP: Duration = Duration::from_millis(300);
/// Turn leg of the front-obstacle maneuver.
const FRONT_TURN: Duration = Duration::from_millis(500);
/// Short reverse before a side-avoidance turn.
const SIDE_BACKUP: Duration = Duration::from_millis(200);
/// Side-avoidance turn.
const SIDE_TURN: Duration = Duration::from_millis(600);
/// Plain advance when the path is clear.
const ADVANCE: Duration = Duration::from_millis(300);
/// Large clockwise rotation that breaks an oscillation deadlock.
const ESCAPE_TURN: Duration = Duration::from_secs(1);
/// Pacing between iterations of the free-exploration loop.
const LOOP_PACING: Duration = Duration::from_millis(500);

/// Which decision-table row a step executed.  Returned for logging and
/// testing; carries no control-flow meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreStep {
    /// The stuck detector fired; a large escape turn replaced the table.
    Escape,
    /// Obstacle ahead with both sides clear: back up and turn right.
    AvoidFront,
    /// Both sides blocked: turn right.
    AvoidBothSides,
    /// Left side blocked: turn right.
    AvoidLeft,
    /// Right side blocked: turn left.
    AvoidRight,
    /// Path clear: move forward.
    Advance,
}

/// Reactive obstacle-avoidance loop over the ultrasonic ring.
pub struct ReactiveExplorer {
    drivetrain: Drivetrain,
    range: Arc<dyn RangeArray>,
    stuck: StuckDetector,
    bus: NoticeBus,
}

impl ReactiveExplorer {
    /// Build an explorer with a fresh, empty stuck window.
    pub fn new(drivetrain: Drivetrain, range: Arc<dyn RangeArray>, bus: NoticeBus) -> Self {
        Self {
            drivetrain,
            range,
            stuck: StuckDetector::new(),
            bus,
        }
    }

    /// Execute one avoidance step: escape check, one fresh sample, one
    /// decision-table row.
    pub async fn step(&mut self) -> Result<ExploreStep, TrundleError> {
        if self.stuck.check() {
            info!("oscillation detected, making a large clockwise escape turn");
            self.bus.publish(SOURCE, Notice::Stuck);
            self.drivetrain
                .pulse(MotorCommand::TurnRight, ESCAPE_TURN)
                .await;
            return Ok(ExploreStep::Escape);
        }

        let d = self.range.read_distances().await?;
        debug!(front = d.front, left = d.left, right = d.right, back = d.back, "distances");

        let front_blocked = DistanceSample::blocks(d.front, FRONT_THRESHOLD_CM);
        let left_blocked = DistanceSample::blocks(d.left, SIDE_THRESHOLD_CM);
        let right_blocked = DistanceSample::blocks(d.right, SIDE_THRESHOLD_CM);

        if front_blocked
            && DistanceSample::clear(d.left, SIDE_THRESHOLD_CM)
            && DistanceSample::clear(d.right, SIDE_THRESHOLD_CM)
        {
            // Obstacle dead ahead, room on both sides: reverse out and turn.
            self.drivetrain.stop();
            sleep(SETTLE).await;
            self.drivetrain.start(MotorCommand::Backward);
            sleep(FRONT_BACKUP).await;
            self.drivetrain.start(MotorCommand::TurnRight);
            sleep(FRONT_TURN).await;
            self.drivetrain.stop();
            return Ok(ExploreStep::AvoidFront);
        }

        if left_blocked && right_blocked {
            self.avoid_side(MotorCommand::TurnRight, d.back).await;
            self.stuck.record(MovementCode::TurnRight);
            return Ok(ExploreStep::AvoidBothSides);
        }

        if left_blocked {
            self.avoid_side(MotorCommand::TurnRight, d.back).await;
            self.stuck.record(MovementCode::TurnRight);
            return Ok(ExploreStep::AvoidLeft);
        }

        if right_blocked {
            self.avoid_side(MotorCommand::TurnLeft, d.back).await;
            self.stuck.record(MovementCode::TurnLeft);
            return Ok(ExploreStep::AvoidRight);
        }

        self.drivetrain.pulse(MotorCommand::Forward, ADVANCE).await;
        self.stuck.record(MovementCode::Forward);
        Ok(ExploreStep::Advance)
    }

    /// Shared body of the three side-avoidance rows: settle, back up when
    /// the rear is known clear, then turn.
    async fn avoid_side(&self, turn: MotorCommand, rear_cm: f32) {
        self.drivetrain.stop();
        sleep(SETTLE).await;
        if DistanceSample::known_beyond(rear_cm, REAR_CLEARANCE_CM) {
            self.drivetrain.pulse(MotorCommand::Backward, SIDE_BACKUP).await;
        }
        self.drivetrain.pulse(turn, SIDE_TURN).await;
    }

    /// Free-exploration loop: one step every half second until cancelled.
    ///
    /// This is the whole of AUTONOMOUS mode.
    pub async fn run(mut self, cancel: CancellationToken) {
        let _guard = self.drivetrain.stop_guard();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.step() => {
                    match result {
                        Ok(step) => debug!(?step, "explore step"),
                        Err(err) => {
                            warn!(%err, "distance poll failed, ending exploration");
                            break;
                        }
                    }
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(LOOP_PACING) => {}
            }
        }
    }
}
