//! Manual driving relay.
//!
//! MANUAL mode is the thinnest behavior there is: pull one [`ManualStep`]
//! at a time off the shared step queue and execute it as a short timed
//! pulse.  Drive steps run a quarter second, turn steps run longer so one
//! keypress produces a visible heading change, and every step ends with
//! the motors stopped, so an operator who walks away leaves a parked
//! robot, not a runaway one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use trundle_hal::MotorCommand;
use trundle_middleware::{ManualStep, NoticeBus};
use trundle_types::Notice;

use crate::motion::Drivetrain;

const SOURCE: &str = "trundle-runtime::manual";

/// Forward/backward nudge per keypress.
const DRIVE_PULSE: Duration = Duration::from_millis(250);
/// Turn per keypress; longer, a quarter second barely moves the heading.
const TURN_PULSE: Duration = Duration::from_millis(700);

/// Receiving end of the manual step queue, shareable across relay
/// restarts.  The dispatcher keeps the sending end; mode switches spawn a
/// fresh relay around the same receiver so queued steps survive them.
pub type StepQueue = Arc<Mutex<mpsc::Receiver<ManualStep>>>;

/// Create the manual step queue pair.
pub fn step_queue() -> (mpsc::Sender<ManualStep>, StepQueue) {
    let (tx, rx) = mpsc::channel(16);
    (tx, Arc::new(Mutex::new(rx)))
}

/// Relay operator steps to the motors until cancelled.
pub async fn relay(
    drivetrain: Drivetrain,
    steps: StepQueue,
    bus: NoticeBus,
    cancel: CancellationToken,
) {
    let _guard = drivetrain.stop_guard();
    let mut steps = steps.lock().await;
    loop {
        let step = tokio::select! {
            _ = cancel.cancelled() => break,
            step = steps.recv() => match step {
                Some(step) => step,
                // Sender side dropped, nothing left to relay.
                None => break,
            },
        };
        debug!(%step, "manual step");
        match step {
            ManualStep::Forward => drivetrain.pulse(MotorCommand::Forward, DRIVE_PULSE).await,
            ManualStep::Backward => drivetrain.pulse(MotorCommand::Backward, DRIVE_PULSE).await,
            ManualStep::Left => drivetrain.pulse(MotorCommand::TurnLeft, TURN_PULSE).await,
            ManualStep::Right => drivetrain.pulse(MotorCommand::TurnRight, TURN_PULSE).await,
            ManualStep::Stop => drivetrain.stop(),
        }
        bus.publish(
            SOURCE,
            Notice::Moved {
                step: step.to_string(),
            },
        );
    }
}
