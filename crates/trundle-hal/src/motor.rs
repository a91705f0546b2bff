//! Generic `MotorDriver` trait for the chassis drive motors.
//!
//! Drivers implement this trait over whatever pulse hardware the chassis
//! carries (GPIO H-bridge, PWM controller, a simulator).  The rest of the
//! system only ever talks to the trait, so the drive electronics can be
//! swapped without touching any behavior logic.
//!
//! Motor commands are fire-and-forget: the chassis offers no encoder
//! feedback, so none of the primitives return anything.  Timing lives one
//! layer up, in the runtime's pulse helpers.

use serde::{Deserialize, Serialize};

/// The five primitive drive states a differential chassis supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
}

impl std::fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotorCommand::Forward => write!(f, "forward"),
            MotorCommand::Backward => write!(f, "backward"),
            MotorCommand::TurnLeft => write!(f, "turn_left"),
            MotorCommand::TurnRight => write!(f, "turn_right"),
            MotorCommand::Stop => write!(f, "stop"),
        }
    }
}

/// A chassis drive-motor driver.
///
/// Implementations must be callable from any task (`&self`, `Send + Sync`);
/// a driver that needs mutable state uses interior mutability.  The active
/// behavior task is the only caller by construction (the mode supervisor
/// serialises behavior switching), so no lock is taken here.
pub trait MotorDriver: Send + Sync {
    /// Drive both wheels forward.
    fn forward(&self);

    /// Drive both wheels backward.
    fn backward(&self);

    /// Rotate the chassis counter-clockwise in place.
    fn turn_left(&self);

    /// Rotate the chassis clockwise in place.
    fn turn_right(&self);

    /// Cut drive to both wheels.
    fn stop(&self);

    /// Dispatch a [`MotorCommand`] to the matching primitive.
    fn apply(&self, cmd: MotorCommand) {
        match cmd {
            MotorCommand::Forward => self.forward(),
            MotorCommand::Backward => self.backward(),
            MotorCommand::TurnLeft => self.turn_left(),
            MotorCommand::TurnRight => self.turn_right(),
            MotorCommand::Stop => self.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TraceMotor {
        seen: Mutex<Vec<MotorCommand>>,
    }

    impl MotorDriver for TraceMotor {
        fn forward(&self) {
            self.seen.lock().unwrap().push(MotorCommand::Forward);
        }
        fn backward(&self) {
            self.seen.lock().unwrap().push(MotorCommand::Backward);
        }
        fn turn_left(&self) {
            self.seen.lock().unwrap().push(MotorCommand::TurnLeft);
        }
        fn turn_right(&self) {
            self.seen.lock().unwrap().push(MotorCommand::TurnRight);
        }
        fn stop(&self) {
            self.seen.lock().unwrap().push(MotorCommand::Stop);
        }
    }

    #[test]
    fn apply_routes_every_command() {
        let motor = TraceMotor {
            seen: Mutex::new(Vec::new()),
        };
        for cmd in [
            MotorCommand::Forward,
            MotorCommand::Backward,
            MotorCommand::TurnLeft,
            MotorCommand::TurnRight,
            MotorCommand::Stop,
        ] {
            motor.apply(cmd);
        }
        assert_eq!(
            *motor.seen.lock().unwrap(),
            vec![
                MotorCommand::Forward,
                MotorCommand::Backward,
                MotorCommand::TurnLeft,
                MotorCommand::TurnRight,
                MotorCommand::Stop,
            ]
        );
    }

    #[test]
    fn motor_command_serializes_snake_case() {
        let json = serde_json::to_string(&MotorCommand::TurnLeft).unwrap();
        assert_eq!(json, "\"turn_left\"");
    }
}
