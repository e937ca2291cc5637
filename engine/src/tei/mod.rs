pub mod commands;
pub mod parser;

pub use commands::{
    go_command, initialization_commands, position_command, stop_command, TeiCommand,
};
pub use parser::parse_tei_message;

#[derive(Debug, thiserror::Error)]
pub enum TeiError {
    #[error("Engine binary not found: {0}")]
    EngineNotFound(String),
    #[error("Failed to spawn engine: {0}")]
    Spawn(std::io::Error),
    #[error("Engine has no stdin")]
    NoStdin,
    #[error("Engine has no stdout")]
    NoStdout,
}
