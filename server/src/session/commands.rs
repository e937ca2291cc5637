use engine::EngineHandle;
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Session actor closed")]
    ActorClosed,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    RequestAnalysis {
        input: String,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    ApplyBestMove {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Replies `None` when there was nothing to undo.
    Undo {
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
    ResetToBase {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Restart {
        engine: EngineHandle,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
