//! `trundle-middleware` – message plumbing
//!
//! The behavior core never speaks a wire protocol.  Outbound status flows
//! through the [`bus`] as typed [`Notice`][trundle_types::Notice]s, and
//! inbound commands arrive pre-decoded as [`command::CommandMessage`]s on
//! per-source channels.  Transport adapters (WebRTC, the voice pipeline)
//! translate at the edges.
//!
//! # Modules
//!
//! - [`bus`] – [`NoticeBus`][bus::NoticeBus]: clone-shared broadcast channel
//!   for fire-and-forget status notices.
//! - [`command`] – [`CommandMessage`][command::CommandMessage] and the
//!   bounded [`command_channel`][command::command_channel] each external
//!   source feeds.

pub mod bus;
pub mod command;

pub use bus::NoticeBus;
pub use command::{CommandMessage, ManualStep, command_channel};
