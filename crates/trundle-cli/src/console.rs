//! Line parser for the interactive console.
//!
//! The console speaks the same decoded [`CommandMessage`] shape as the web
//! operator and voice sources, so everything typed here goes through the
//! exact arbitration and dispatch path a remote command would.

use trundle_middleware::{CommandMessage, ManualStep};
use trundle_types::Mode;

/// What one console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// A command to dispatch.
    Command(CommandMessage),
    /// Leave the program.
    Quit,
    /// Print the command reference.
    Help,
    /// Nothing typed.
    Empty,
    /// Anything else.
    Unknown(String),
}

/// Parse one console line.
pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let rest = words.collect::<Vec<_>>().join(" ");

    let step = |step| ConsoleInput::Command(CommandMessage::Motor(step));
    match head.as_str() {
        "w" | "forward" => step(ManualStep::Forward),
        "s" | "backward" => step(ManualStep::Backward),
        "a" | "left" => step(ManualStep::Left),
        "d" | "right" => step(ManualStep::Right),
        "x" | "stop" => step(ManualStep::Stop),
        "auto" | "explore" => ConsoleInput::Command(CommandMessage::SetMode(Mode::Autonomous)),
        "manual" => ConsoleInput::Command(CommandMessage::SetMode(Mode::Manual)),
        "find" if !rest.is_empty() => {
            ConsoleInput::Command(CommandMessage::Find { target: rest })
        }
        "follow" => ConsoleInput::Command(CommandMessage::Follow {
            target: if rest.is_empty() {
                "person".to_string()
            } else {
                rest
            },
        }),
        "quit" | "exit" => ConsoleInput::Quit,
        "help" | "?" => ConsoleInput::Help,
        _ => ConsoleInput::Unknown(line.to_string()),
    }
}

/// The command reference printed by `help`.
pub const HELP: &str = "\
  w / a / s / d   drive forward / left / backward / right (manual mode)
  x               stop the motors
  auto            free exploration with obstacle avoidance
  manual          manual driving mode
  find <object>   sweep for an object, then drive to it
  follow [name]   follow a target (default: person)
  quit            stop the motors and exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_keys_map_to_manual_steps() {
        assert_eq!(
            parse_line("w"),
            ConsoleInput::Command(CommandMessage::Motor(ManualStep::Forward))
        );
        assert_eq!(
            parse_line("a"),
            ConsoleInput::Command(CommandMessage::Motor(ManualStep::Left))
        );
        assert_eq!(
            parse_line("stop"),
            ConsoleInput::Command(CommandMessage::Motor(ManualStep::Stop))
        );
    }

    #[test]
    fn find_keeps_the_whole_target_name() {
        assert_eq!(
            parse_line("find sports ball"),
            ConsoleInput::Command(CommandMessage::Find {
                target: "sports ball".to_string()
            })
        );
    }

    #[test]
    fn bare_find_is_not_a_command() {
        assert_eq!(parse_line("find"), ConsoleInput::Unknown("find".to_string()));
    }

    #[test]
    fn follow_defaults_to_person() {
        assert_eq!(
            parse_line("follow"),
            ConsoleInput::Command(CommandMessage::Follow {
                target: "person".to_string()
            })
        );
    }

    #[test]
    fn parsing_is_case_insensitive_and_trims() {
        assert_eq!(
            parse_line("  AUTO  "),
            ConsoleInput::Command(CommandMessage::SetMode(Mode::Autonomous))
        );
        assert_eq!(parse_line("QUIT"), ConsoleInput::Quit);
    }

    #[test]
    fn blank_and_garbage_lines() {
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
        assert_eq!(
            parse_line("dance"),
            ConsoleInput::Unknown("dance".to_string())
        );
    }
}
