pub mod tei;
pub mod tiltak;

pub use tei::{parse_tei_message, TeiCommand, TeiError};
pub use tiltak::{EngineConfig, TiltakEngine};

use tokio::sync::mpsc;

/// Handle for communicating with a TEI engine.
///
/// Both directions carry one protocol line per message and preserve order.
/// Whoever owns the handle owns the conversation: dropping `tx` tells the
/// engine side no more commands will come, and `rx` yielding `None` means the
/// engine went away.
pub struct EngineHandle {
    pub tx: mpsc::Sender<String>,
    pub rx: mpsc::Receiver<String>,
}

/// The engine's end of an in-memory [`EngineHandle`].
pub struct EnginePeer {
    /// Commands written by the session, in order.
    pub commands: mpsc::Receiver<String>,
    /// Lines emitted by the engine.
    pub lines: mpsc::Sender<String>,
}

impl EngineHandle {
    /// Build a connected handle/peer pair without any process behind it.
    ///
    /// Used for engines running in-process and for driving a session in tests.
    pub fn pair(capacity: usize) -> (EngineHandle, EnginePeer) {
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
        let (line_tx, line_rx) = mpsc::channel(capacity);
        (
            EngineHandle {
                tx: cmd_tx,
                rx: line_rx,
            },
            EnginePeer {
                commands: cmd_rx,
                lines: line_tx,
            },
        )
    }
}

/// Game parameters sent once per engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeiSettings {
    pub board_size: u8,
    pub half_komi: i8,
    /// Value passed to `go movetime`. Large enough to mean "think until stopped".
    pub movetime: u64,
}

impl Default for TeiSettings {
    fn default() -> Self {
        Self {
            board_size: 6,
            half_komi: 4,
            movetime: 1_000_000,
        }
    }
}

/// Engine analysis decoded from one `info` line.
///
/// Each line produces a complete snapshot; a newer one replaces an older one
/// outright, fields are never merged across lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSnapshot {
    /// Principal variation as engine move tokens.
    pub pv: Vec<String>,
    pub nps: Option<u64>,
    pub score: Option<i64>,
    pub time_ms: Option<u64>,
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub nodes: Option<u64>,
}

impl AnalysisSnapshot {
    /// Evaluation as a percentage, `(score + 100) / 2`. Unknown scores count as 0.
    pub fn evaluation_percent(&self) -> f64 {
        (self.score.unwrap_or(0) as f64 + 100.0) / 2.0
    }

    /// First move of the principal variation, if any.
    pub fn best_line_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

/// A line from the engine, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    InfoUpdate(AnalysisSnapshot),
    BestMove(String),
    Unrecognized(String),
}
