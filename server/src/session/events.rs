use engine::AnalysisSnapshot;

use super::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// Latest decoded `info` line (frequent, lightweight).
    Analysis(AnalysisSnapshot),
    /// The engine finished or was stopped.
    BestMove(String),
    /// Engine output the decoder didn't understand, verbatim.
    Unrecognized(String),
    /// TEI debug log entry.
    TeiMessage(TeiLogEntry),
}

#[derive(Debug, Clone)]
pub struct TeiLogEntry {
    pub direction: TeiDirection,
    pub line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeiDirection {
    ToEngine,
    FromEngine,
}
