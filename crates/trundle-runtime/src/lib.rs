//! `trundle-runtime` – the behavior engine.
//!
//! Everything that actually moves the chassis lives here: the reactive
//! control loops, the per-mode behavior entries the supervisor spawns,
//! and the dispatcher that turns decoded operator/voice commands into
//! mode switches.
//!
//! # Modules
//!
//! - [`motion`] – [`Drivetrain`][motion::Drivetrain]:
//!   timed motor pulses over the HAL primitives, plus
//!   [`StopGuard`][motion::StopGuard], the drop guard that makes "motors
//!   stopped on every exit path" a structural property rather than a
//!   convention.
//! - [`stuck`] – [`StuckDetector`][stuck::StuckDetector]:
//!   the four-entry movement-code window that recognises left/right and
//!   forward/backward oscillation deadlocks.
//! - [`explorer`] – [`ReactiveExplorer`][explorer::ReactiveExplorer]:
//!   threshold-based obstacle avoidance over the ultrasonic ring; the
//!   whole of AUTONOMOUS mode and the wander step of a failed search.
//! - [`scanner`] – [`DirectionalScanner`][scanner::DirectionalScanner]:
//!   the rotating four-heading visual sweep for a named object.
//! - [`approach`] – [`ApproachController`][approach::ApproachController]:
//!   closed-loop pursuit fusing vision bearing with ultrasonic range,
//!   with lost-target recovery.
//! - [`manual`] – the MANUAL-mode step relay and its shared queue.
//! - [`behavior`] – [`BehaviorContext`][behavior::BehaviorContext] and
//!   the four mode entry points the supervisor runs.
//! - [`dispatch`] – [`Dispatcher`][dispatch::Dispatcher]:
//!   arbiter-bracketed command routing from the external sources.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   global `tracing` subscriber setup.

pub mod approach;
pub mod behavior;
pub mod dispatch;
pub mod explorer;
pub mod manual;
pub mod motion;
pub mod scanner;
pub mod stuck;
pub mod telemetry;

pub use approach::{ApproachConfig, ApproachController, ApproachOutcome};
pub use behavior::{BehaviorContext, BehaviorSettings};
pub use dispatch::Dispatcher;
pub use explorer::{ExploreStep, ReactiveExplorer};
pub use manual::{StepQueue, step_queue};
pub use motion::{Drivetrain, StopGuard};
pub use scanner::DirectionalScanner;
pub use stuck::StuckDetector;
pub use telemetry::init_tracing;
