//! [`ApproachController`] – closed-loop pursuit of a named target.
//!
//! The only loop in the stack that fuses both sensor families: the vision
//! tracker supplies a coarse bearing (left, center, right, or lost) while
//! the front ultrasonic supplies range.  The two corrections are applied
//! in mutually exclusive branches, one axis per iteration: bearing steers,
//! range closes or opens the gap, never both in one pulse.  A target that
//! is off-center and too close at once gets the bearing correction first
//! and the range correction on a later pass.
//!
//! Per iteration, in priority order:
//!
//! 1. target lost: count the miss, stop; at the limit spin a short search
//!    rotation and reset the counter
//! 2. stuck window matched: large escape rotation
//! 3. anything closer than the emergency threshold ahead: back out
//! 4. off-center bearing: short corrective turn
//! 5. centered: forward above the safe band, backward below it, hold
//!    inside it (return when not in follow mode)

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trundle_hal::{Announcer, MotorCommand, RangeArray, Vision};
use trundle_middleware::NoticeBus;
use trundle_types::{Bearing, DistanceSample, MovementCode, Notice, TrundleError};

use crate::motion::Drivetrain;
use crate::stuck::StuckDetector;

const SOURCE: &str = "trundle-runtime::approach";

/// Anything known to be closer than this ahead forces a backup, whatever
/// the bearing says.
const EMERGENCY_CM: f32 = 30.0;
/// Short rotation hunting for a target lost past the frame limit.
const SEARCH_TURN: Duration = Duration::from_millis(400);
/// Large rotation breaking a corrective-pulse oscillation.
const ESCAPE_TURN: Duration = Duration::from_millis(1200);
/// Emergency reverse away from an obstacle dead ahead.
const EMERGENCY_BACKUP: Duration = Duration::from_millis(500);
/// Small bearing-correction turn.
const BEARING_PULSE: Duration = Duration::from_millis(200);
/// Range-correction drive, forward or backward.
const RANGE_PULSE: Duration = Duration::from_millis(500);
/// Pause between control iterations.
const ITERATION_PACING: Duration = Duration::from_millis(100);

/// Tuning for one approach run.
#[derive(Debug, Clone, Copy)]
pub struct ApproachConfig {
    /// Center of the standoff band, in centimetres.
    pub safe_distance_cm: f32,
    /// Half-width of the standoff band.
    pub tolerance_cm: f32,
    /// Consecutive lost frames tolerated before a search rotation.
    pub max_lost_frames: u32,
    /// Keep station forever instead of returning once in band.
    pub follow: bool,
}

impl ApproachConfig {
    /// Drive to the target once and return when in band.
    pub fn reach(safe_distance_cm: f32, max_lost_frames: u32) -> Self {
        Self {
            safe_distance_cm,
            tolerance_cm: 10.0,
            max_lost_frames,
            follow: false,
        }
    }

    /// Keep station on the target until cancelled.
    pub fn follow(safe_distance_cm: f32, max_lost_frames: u32) -> Self {
        Self {
            follow: true,
            ..Self::reach(safe_distance_cm, max_lost_frames)
        }
    }
}

/// How an approach run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachOutcome {
    /// Target centered inside the standoff band (non-follow runs only).
    Reached,
    /// Cancelled from outside before reaching the target.
    Cancelled,
    /// A sensor fault ended the run.
    Failed,
}

enum Iteration {
    Continue,
    Reached,
}

/// Bearing-and-range pursuit loop.
pub struct ApproachController {
    drivetrain: Drivetrain,
    range: Arc<dyn RangeArray>,
    vision: Arc<dyn Vision>,
    announcer: Arc<dyn Announcer>,
    stuck: StuckDetector,
    bus: NoticeBus,
    lost_frames: u32,
}

impl ApproachController {
    pub fn new(
        drivetrain: Drivetrain,
        range: Arc<dyn RangeArray>,
        vision: Arc<dyn Vision>,
        announcer: Arc<dyn Announcer>,
        bus: NoticeBus,
    ) -> Self {
        Self {
            drivetrain,
            range,
            vision,
            announcer,
            stuck: StuckDetector::new(),
            bus,
            lost_frames: 0,
        }
    }

    /// Pursue `target` until reached (non-follow), cancelled, or a sensor
    /// fails.  The motors are stopped on every exit path.
    pub async fn run(
        mut self,
        target: &str,
        config: ApproachConfig,
        cancel: CancellationToken,
    ) -> ApproachOutcome {
        let _guard = self.drivetrain.stop_guard();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return ApproachOutcome::Cancelled,
                result = self.iteration(target, &config) => {
                    match result {
                        Ok(Iteration::Continue) => {}
                        Ok(Iteration::Reached) => {
                            info!(target, "target reached, holding inside the safe band");
                            return ApproachOutcome::Reached;
                        }
                        Err(err) => {
                            warn!(%err, "sensor fault ended the approach");
                            return ApproachOutcome::Failed;
                        }
                    }
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => return ApproachOutcome::Cancelled,
                _ = sleep(ITERATION_PACING) => {}
            }
        }
    }

    async fn iteration(
        &mut self,
        target: &str,
        config: &ApproachConfig,
    ) -> Result<Iteration, TrundleError> {
        let fix = self.vision.track(target).await?;
        let d = self.range.read_distances().await?;

        let Some((bearing, area)) = fix else {
            self.lost_frames += 1;
            self.drivetrain.stop();
            if self.lost_frames >= config.max_lost_frames {
                debug!(target, "lost past the frame limit, making a search rotation");
                self.bus.publish(
                    SOURCE,
                    Notice::TargetLost {
                        name: target.to_string(),
                    },
                );
                self.drivetrain
                    .pulse(MotorCommand::TurnRight, SEARCH_TURN)
                    .await;
                self.lost_frames = 0;
            }
            return Ok(Iteration::Continue);
        };
        self.lost_frames = 0;
        debug!(?bearing, area, front = d.front, "tracking fix");

        if self.stuck.check() {
            info!("corrective pulses are oscillating, making an escape rotation");
            self.bus.publish(SOURCE, Notice::Stuck);
            self.drivetrain
                .pulse(MotorCommand::TurnRight, ESCAPE_TURN)
                .await;
            return Ok(Iteration::Continue);
        }

        if DistanceSample::blocks(d.front, EMERGENCY_CM) {
            self.drivetrain
                .pulse(MotorCommand::Backward, EMERGENCY_BACKUP)
                .await;
            self.stuck.record(MovementCode::Backward);
            return Ok(Iteration::Continue);
        }

        match bearing {
            Bearing::Left => {
                self.drivetrain
                    .pulse(MotorCommand::TurnLeft, BEARING_PULSE)
                    .await;
                self.stuck.record(MovementCode::TurnLeft);
            }
            Bearing::Right => {
                self.drivetrain
                    .pulse(MotorCommand::TurnRight, BEARING_PULSE)
                    .await;
                self.stuck.record(MovementCode::TurnRight);
            }
            Bearing::Center => {
                let above = config.safe_distance_cm + config.tolerance_cm;
                let below = config.safe_distance_cm - config.tolerance_cm;
                if DistanceSample::clear(d.front, above) {
                    // Too far (or range unknown): close the gap.
                    self.drivetrain
                        .pulse(MotorCommand::Forward, RANGE_PULSE)
                        .await;
                    self.stuck.record(MovementCode::Forward);
                } else if DistanceSample::blocks(d.front, below) {
                    self.drivetrain
                        .pulse(MotorCommand::Backward, RANGE_PULSE)
                        .await;
                    self.stuck.record(MovementCode::Backward);
                } else {
                    self.drivetrain.stop();
                    if config.follow {
                        // Station kept; tell the person being followed.
                        self.announcer.say("I am following you").await;
                        self.bus.publish(
                            SOURCE,
                            Notice::Holding {
                                distance_cm: d.front,
                            },
                        );
                    } else {
                        return Ok(Iteration::Reached);
                    }
                }
            }
        }
        Ok(Iteration::Continue)
    }
}
