use std::fmt;

use crate::TeiSettings;

/// Outgoing command to a TEI engine. `Display` renders the wire line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeiCommand {
    Tei,
    NewGame { size: u8 },
    SetOption { name: String, value: String },
    Position { tps: String },
    Go { movetime: u64 },
    Stop,
    Quit,
}

impl fmt::Display for TeiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeiCommand::Tei => write!(f, "tei"),
            TeiCommand::NewGame { size } => write!(f, "teinewgame {}", size),
            TeiCommand::SetOption { name, value } => {
                write!(f, "setoption name {} value {}", name, value)
            }
            TeiCommand::Position { tps } => write!(f, "position tps {}", tps),
            TeiCommand::Go { movetime } => write!(f, "go movetime {}", movetime),
            TeiCommand::Stop => write!(f, "stop"),
            TeiCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Handshake, new game and komi, in the order the engine expects them.
pub fn initialization_commands(settings: &TeiSettings) -> Vec<TeiCommand> {
    vec![
        TeiCommand::Tei,
        TeiCommand::NewGame {
            size: settings.board_size,
        },
        TeiCommand::SetOption {
            name: "HalfKomi".to_string(),
            value: settings.half_komi.to_string(),
        },
    ]
}

pub fn position_command(rendered_position: &str) -> TeiCommand {
    TeiCommand::Position {
        tps: rendered_position.to_string(),
    }
}

pub fn go_command(movetime: u64) -> TeiCommand {
    TeiCommand::Go { movetime }
}

pub fn stop_command() -> TeiCommand {
    TeiCommand::Stop
}
