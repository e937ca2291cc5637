pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod ledger;
pub mod snapshot;
pub mod state;

use engine::{EngineHandle, TeiSettings};
use tokio::sync::{broadcast, mpsc};

use actor::run_session_actor;
pub use events::{SessionEvent, TeiDirection, TeiLogEntry};
pub use handle::SessionHandle;
pub use snapshot::{SessionSnapshot, SessionStatus};
use state::SessionState;

/// Start a session actor on the current runtime.
///
/// Without an engine the session starts out `Disconnected`; attach one later
/// with [`SessionHandle::restart`].
pub fn spawn_session(
    settings: TeiSettings,
    base: impl Into<String>,
    engine: Option<EngineHandle>,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(256);

    let mut state = SessionState::new(settings, base);
    if engine.is_none() {
        state.on_disconnected();
    }

    tokio::spawn(run_session_actor(state, engine, cmd_rx, event_tx));

    SessionHandle::new(cmd_tx)
}
