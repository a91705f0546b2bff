//! [`Drivetrain`] – timed motor pulses over the raw drive primitives.
//!
//! The chassis has no encoders, so every motion is a fixed-duration pulse:
//! start a primitive, hold it for a set time, cut the motors.  The hold is a
//! `tokio::time::sleep`, which is also the suspension point at which a
//! behavior task observes cancellation.
//!
//! Pulse durations are fixed, not distance-proportional.  That is inherited
//! behavior, kept as-is.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use trundle_hal::{MotorCommand, MotorDriver};

/// Shared handle to the drive motors with timed-pulse helpers.
///
/// Clones share the same underlying driver.
#[derive(Clone)]
pub struct Drivetrain {
    motor: Arc<dyn MotorDriver>,
}

impl Drivetrain {
    /// Wrap a motor driver.
    pub fn new(motor: Arc<dyn MotorDriver>) -> Self {
        Self { motor }
    }

    /// Apply `cmd`, hold it for `duration`, then stop.
    ///
    /// Cancelling the task mid-pulse drops this future with the motors still
    /// running; the behavior's [`StopGuard`] covers that exit.
    pub async fn pulse(&self, cmd: MotorCommand, duration: Duration) {
        self.motor.apply(cmd);
        sleep(duration).await;
        self.motor.stop();
    }

    /// Apply `cmd` without a deadline.  The caller owns the follow-up stop.
    pub fn start(&self, cmd: MotorCommand) {
        self.motor.apply(cmd);
    }

    /// Cut the drive motors immediately.
    pub fn stop(&self) {
        self.motor.stop();
    }

    /// A scoped guard that stops the motors when dropped.
    ///
    /// Every behavior task takes one at entry, which makes the unconditional
    /// motor stop reachable on every exit path: normal return, cooperative
    /// cancellation mid-pulse, and unwinding panics alike.
    pub fn stop_guard(&self) -> StopGuard {
        StopGuard {
            motor: Arc::clone(&self.motor),
        }
    }
}

/// Stops the motors on drop.  See [`Drivetrain::stop_guard`].
pub struct StopGuard {
    motor: Arc<dyn MotorDriver>,
}

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.motor.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trundle_hal::SimMotor;

    #[tokio::test(start_paused = true)]
    async fn pulse_starts_holds_and_stops() {
        let motor = Arc::new(SimMotor::new());
        let drivetrain = Drivetrain::new(motor.clone());

        drivetrain
            .pulse(MotorCommand::Forward, Duration::from_millis(300))
            .await;

        assert_eq!(
            motor.commands(),
            vec![MotorCommand::Forward, MotorCommand::Stop]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_pulse_is_covered_by_the_guard() {
        let motor = Arc::new(SimMotor::new());
        let drivetrain = Drivetrain::new(motor.clone());

        let task_motor = drivetrain.clone();
        let handle = tokio::spawn(async move {
            let _guard = task_motor.stop_guard();
            task_motor
                .pulse(MotorCommand::TurnRight, Duration::from_secs(10))
                .await;
        });
        // Let the pulse start, then kill the task mid-hold.
        tokio::time::sleep(Duration::from_millis(5)).await;
        handle.abort();
        let _ = handle.await;

        assert_eq!(motor.last(), Some(MotorCommand::Stop));
    }

    #[tokio::test]
    async fn stop_guard_fires_on_scope_exit() {
        let motor = Arc::new(SimMotor::new());
        let drivetrain = Drivetrain::new(motor.clone());

        {
            let _guard = drivetrain.stop_guard();
            drivetrain.start(MotorCommand::Forward);
        }

        assert_eq!(
            motor.commands(),
            vec![MotorCommand::Forward, MotorCommand::Stop]
        );
    }
}
