use std::fmt;

use engine::AnalysisSnapshot;

/// Whether the engine is believed to be searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Thinking,
    /// The engine channel closed. Nothing is sent until a restart.
    Disconnected,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Paused",
            SessionStatus::Thinking => "Calculating...",
            SessionStatus::Disconnected => "Engine disconnected",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete, immutable snapshot of session state.
/// Sent to observers on every state change and on subscribe.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Position text as the user last supplied it.
    pub base: String,
    /// What the engine was (or will be) told: base plus applied moves.
    pub position: String,
    pub moves: Vec<String>,
    pub status: SessionStatus,
    pub analysis: AnalysisSnapshot,
    /// `(score + 100) / 2`, with an unknown score counted as 0.
    pub evaluation_percent: f64,
    /// Last `bestmove` reported. Informational only.
    pub best_move: Option<String>,
    /// First move of the current principal variation.
    pub next_move: Option<String>,
    pub can_apply_next: bool,
    pub can_undo: bool,
    pub can_reset: bool,
    pub initialized: bool,
}
