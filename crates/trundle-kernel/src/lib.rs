//! `trundle-kernel` – Mode & Medium Arbitration
//!
//! The regulating layer of the behavior core.  It does not navigate; it
//! decides *who* may command the robot and *which* behavior task owns the
//! motors.
//!
//! # Modules
//!
//! - [`arbiter`] – [`MediumArbiter`][arbiter::MediumArbiter]: mutual
//!   exclusion between the web operator and the voice pipeline, with an
//!   anti-starvation rule that keeps a denied voice request from being
//!   locked out by web traffic.
//! - [`supervisor`] – [`ModeSupervisor`][supervisor::ModeSupervisor]:
//!   serialised behavior switching with cooperative cancellation: the
//!   previous behavior task is cancelled and awaited before its replacement
//!   is spawned, so at most one task ever issues motor commands.
//!
//! Both are process-lifetime singletons constructed at startup and passed by
//! reference into every task that needs them; there is no ambient global
//! state.

pub mod arbiter;
pub mod supervisor;

pub use arbiter::MediumArbiter;
pub use supervisor::ModeSupervisor;
