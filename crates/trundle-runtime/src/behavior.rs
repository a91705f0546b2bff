//! Behavior entry points and the shared hardware context they run over.
//!
//! Each MODE maps to one async entry function here.  The dispatcher hands
//! these to the mode supervisor as cancellable tasks; every entry owns its
//! own control-loop state (stuck window, lost-frame counter) so a mode
//! switch starts from a clean slate, while the hardware handles and the
//! manual step queue are shared through [`BehaviorContext`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use trundle_hal::{Announcer, MotorDriver, RangeArray, Vision};
use trundle_middleware::NoticeBus;

use crate::approach::{ApproachConfig, ApproachController, ApproachOutcome};
use crate::explorer::ReactiveExplorer;
use crate::manual::{self, StepQueue};
use crate::motion::Drivetrain;
use crate::scanner::DirectionalScanner;

/// Tuning shared by the target-directed behaviors.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorSettings {
    /// Standoff band center for a one-shot approach, in centimetres.
    pub safe_distance_cm: f32,
    /// Standoff band center while following.
    pub follow_distance_cm: f32,
    /// Lost frames tolerated before an approach starts search-rotating.
    pub max_lost_frames: u32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            safe_distance_cm: 50.0,
            follow_distance_cm: 40.0,
            max_lost_frames: 5,
        }
    }
}

/// Everything a behavior needs to run: hardware handles, the notice bus,
/// the manual step queue, and tuning.  Cheap to clone, one clone per
/// spawned behavior.
#[derive(Clone)]
pub struct BehaviorContext {
    pub motor: Arc<dyn MotorDriver>,
    pub range: Arc<dyn RangeArray>,
    pub vision: Arc<dyn Vision>,
    pub announcer: Arc<dyn Announcer>,
    pub bus: NoticeBus,
    pub steps: StepQueue,
    pub settings: BehaviorSettings,
}

impl BehaviorContext {
    fn drivetrain(&self) -> Drivetrain {
        Drivetrain::new(self.motor.clone())
    }
}

/// MANUAL: relay operator steps to the motors.
pub async fn manual_relay(ctx: BehaviorContext, cancel: CancellationToken) {
    manual::relay(ctx.drivetrain(), ctx.steps.clone(), ctx.bus.clone(), cancel).await;
}

/// AUTONOMOUS: free exploration with obstacle avoidance.
pub async fn explore(ctx: BehaviorContext, cancel: CancellationToken) {
    ReactiveExplorer::new(ctx.drivetrain(), ctx.range.clone(), ctx.bus.clone())
        .run(cancel)
        .await;
}

/// FIND: sweep for the target, approach it once sighted, and wander one
/// exploration step between failed sweeps.  Ends when the target is
/// reached or the mode is switched away.
pub async fn find_object(ctx: BehaviorContext, target: String, cancel: CancellationToken) {
    let drivetrain = ctx.drivetrain();
    let _guard = drivetrain.stop_guard();
    let scanner = DirectionalScanner::new(drivetrain.clone(), ctx.vision.clone(), ctx.bus.clone());
    // One explorer for the whole search so its stuck window spans the
    // wander steps between sweeps.
    let mut explorer =
        ReactiveExplorer::new(drivetrain.clone(), ctx.range.clone(), ctx.bus.clone());

    loop {
        let found = tokio::select! {
            _ = cancel.cancelled() => return,
            result = scanner.scan_for(&target) => match result {
                Ok(found) => found,
                Err(err) => {
                    warn!(%err, target, "vision fault ended the search");
                    return;
                }
            },
        };

        if found {
            let approach = ApproachController::new(
                drivetrain.clone(),
                ctx.range.clone(),
                ctx.vision.clone(),
                ctx.announcer.clone(),
                ctx.bus.clone(),
            );
            let config = ApproachConfig::reach(
                ctx.settings.safe_distance_cm,
                ctx.settings.max_lost_frames,
            );
            match approach.run(&target, config, cancel.clone()).await {
                ApproachOutcome::Reached => {
                    ctx.announcer.say(&format!("I found the {target}")).await;
                }
                ApproachOutcome::Cancelled | ApproachOutcome::Failed => {}
            }
            return;
        }

        // Not visible from here. Wander one step and sweep again.
        let stepped = tokio::select! {
            _ = cancel.cancelled() => return,
            result = explorer.step() => result,
        };
        if let Err(err) = stepped {
            warn!(%err, target, "distance fault ended the search");
            return;
        }
    }
}

/// FOLLOW: keep station on the target until the mode is switched away.
pub async fn follow_target(ctx: BehaviorContext, target: String, cancel: CancellationToken) {
    let approach = ApproachController::new(
        ctx.drivetrain(),
        ctx.range.clone(),
        ctx.vision.clone(),
        ctx.announcer.clone(),
        ctx.bus.clone(),
    );
    let config = ApproachConfig::follow(
        ctx.settings.follow_distance_cm,
        ctx.settings.max_lost_frames,
    );
    // A follow run only returns on cancellation or a sensor fault; either
    // way the controller has already stopped the motors.
    approach.run(&target, config, cancel).await;
}
