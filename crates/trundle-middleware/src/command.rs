//! Typed command traffic from the external command sources.
//!
//! The web operator transport and the voice pipeline live outside this core;
//! by the time a command reaches us it has already been decoded into a
//! [`CommandMessage`].  Each source pushes its messages down a bounded mpsc
//! channel created with [`command_channel`], and the runtime's dispatcher
//! pumps the receiving end.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use trundle_types::Mode;

/// Buffer depth of a command channel.  Command sources are human-paced, so a
/// small bound is plenty; a full channel applies backpressure to the source.
const COMMAND_BUFFER: usize = 16;

/// One manual driving step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualStep {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl std::fmt::Display for ManualStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManualStep::Forward => write!(f, "forward"),
            ManualStep::Backward => write!(f, "backward"),
            ManualStep::Left => write!(f, "left"),
            ManualStep::Right => write!(f, "right"),
            ManualStep::Stop => write!(f, "stop"),
        }
    }
}

/// A fully decoded command from an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "command", rename_all = "lowercase")]
pub enum CommandMessage {
    /// Relay one manual driving step to the motors.
    Motor(ManualStep),
    /// Switch the active behavior family.
    SetMode(Mode),
    /// Search the surroundings for a named object, then approach it.
    Find { target: String },
    /// Continuously follow a named target.
    Follow { target: String },
}

/// Create the bounded channel pair one command source feeds.
pub fn command_channel() -> (mpsc::Sender<CommandMessage>, mpsc::Receiver<CommandMessage>) {
    mpsc::channel(COMMAND_BUFFER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_message_tagged_roundtrip() {
        let msg = CommandMessage::Find {
            target: "bottle".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"find\""));
        let back: CommandMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn motor_step_roundtrip() {
        let msg = CommandMessage::Motor(ManualStep::Left);
        let json = serde_json::to_string(&msg).unwrap();
        let back: CommandMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn mode_change_decodes_from_operator_shape() {
        // The shape the web operator UI actually sends.
        let json = r#"{"type":"setmode","command":"autonomous"}"#;
        let msg: CommandMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, CommandMessage::SetMode(Mode::Autonomous));
    }

    #[tokio::test]
    async fn command_channel_delivers_in_order() {
        let (tx, mut rx) = command_channel();
        tx.send(CommandMessage::Motor(ManualStep::Forward))
            .await
            .unwrap();
        tx.send(CommandMessage::SetMode(Mode::Manual)).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(CommandMessage::Motor(ManualStep::Forward))
        );
        assert_eq!(rx.recv().await, Some(CommandMessage::SetMode(Mode::Manual)));
    }
}
