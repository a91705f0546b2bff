//! `trundle-hal` – hardware trait seams
//!
//! The behavior core never touches GPIO pins, echo timers, camera buffers,
//! or audio devices.  It talks to four narrow traits, and real drivers or
//! simulated doubles are injected at startup:
//!
//! - [`motor`] – [`MotorDriver`][motor::MotorDriver]: fire-and-forget drive
//!   primitives (`forward`/`backward`/`turn_left`/`turn_right`/`stop`).
//! - [`range`] – [`RangeArray`][range::RangeArray]: one async poll of the
//!   four-sensor ultrasonic ring, with per-sensor
//!   [`NO_ECHO`][trundle_types::NO_ECHO] timeouts.
//! - [`vision`] – [`Vision`][vision::Vision]: per-frame object detection and
//!   single-target bearing tracking.
//! - [`speech`] – [`Announcer`][speech::Announcer]: best-effort spoken
//!   announcements.
//! - [`sim`] – scripted in-process doubles for all of the above, used by the
//!   test suites and the CLI's sim mode.

pub mod motor;
pub mod range;
pub mod sim;
pub mod speech;
pub mod vision;

pub use motor::{MotorCommand, MotorDriver};
pub use range::RangeArray;
pub use sim::{RecordingAnnouncer, ScriptedRangeArray, ScriptedVision, SimMotor};
pub use speech::Announcer;
pub use vision::Vision;
