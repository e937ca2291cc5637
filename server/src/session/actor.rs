use engine::{EngineHandle, EngineMessage, TeiCommand};
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use super::commands::*;
use super::events::*;
use super::snapshot::SessionStatus;
use super::state::SessionState;

/// The main session actor loop.
/// Owns all mutable state. Processes intents and engine lines sequentially.
pub(crate) async fn run_session_actor(
    state: SessionState,
    engine: Option<EngineHandle>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    run_session_actor_inner(state, engine, cmd_rx, event_tx)
        .instrument(tracing::info_span!("session"))
        .await;
}

async fn run_session_actor_inner(
    mut state: SessionState,
    mut engine: Option<EngineHandle>,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::info!("Session actor started");

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, &mut engine, cmd, &event_tx).await,
                }
            }

            line = next_engine_line(&mut engine) => {
                match line {
                    Some(line) => handle_engine_line(&mut state, line, &event_tx),
                    None => {
                        tracing::warn!("Engine output closed");
                        disconnect(&mut state, &mut engine, &event_tx);
                    }
                }
            }
        }
    }

    tracing::info!("Session actor exited");
}

/// Next line from the engine, or pending forever when none is attached.
async fn next_engine_line(engine: &mut Option<EngineHandle>) -> Option<String> {
    match engine.as_mut() {
        Some(engine) => engine.rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn handle_command(
    state: &mut SessionState,
    engine: &mut Option<EngineHandle>,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match cmd {
        SessionCommand::RequestAnalysis { input, reply } => {
            let commands = state.request_analysis(&input);
            send_commands(state, engine, commands, event_tx).await;
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::ApplyBestMove { reply } => {
            let moves_before = state.ledger.moves().len();
            let commands = state.apply_best_principal_move();
            let changed = state.ledger.moves().len() != moves_before;
            send_commands(state, engine, commands, event_tx).await;
            let snapshot = state.snapshot();
            if changed {
                let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            }
            let _ = reply.send(snapshot);
        }
        SessionCommand::Undo { reply } => {
            let moves_before = state.ledger.moves().len();
            let commands = state.undo();
            if state.ledger.moves().len() == moves_before {
                tracing::debug!("Nothing to undo");
                let _ = reply.send(None);
                return;
            }
            send_commands(state, engine, commands, event_tx).await;
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(Some(snapshot));
        }
        SessionCommand::ResetToBase { reply } => {
            let commands = state.reset_to_base();
            send_commands(state, engine, commands, event_tx).await;
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::Stop { reply } => {
            let commands = state.stop();
            send_commands(state, engine, commands, event_tx).await;
            let _ = reply.send(());
        }
        SessionCommand::Restart {
            engine: new_engine,
            reply,
        } => {
            tracing::info!("Attaching new engine (was {:?})", state.status);
            *engine = Some(new_engine);
            state.on_reconnected();
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(snapshot);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => unreachable!(),
    }
}

/// Deliver commands in order. A closed engine input ends the batch and
/// marks the session disconnected.
async fn send_commands(
    state: &mut SessionState,
    engine: &mut Option<EngineHandle>,
    commands: Vec<TeiCommand>,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    for cmd in commands {
        let Some(handle) = engine.as_ref() else {
            tracing::warn!("No engine attached, dropping {:?}", cmd);
            return;
        };

        let line = cmd.to_string();
        tracing::debug!("Sending {}", line);
        let _ = event_tx.send(SessionEvent::TeiMessage(TeiLogEntry {
            direction: TeiDirection::ToEngine,
            line: line.clone(),
        }));

        if handle.tx.send(line).await.is_err() {
            tracing::error!("Engine input closed while sending {:?}", cmd);
            disconnect(state, engine, event_tx);
            return;
        }
    }
}

fn handle_engine_line(
    state: &mut SessionState,
    line: String,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    let _ = event_tx.send(SessionEvent::TeiMessage(TeiLogEntry {
        direction: TeiDirection::FromEngine,
        line: line.clone(),
    }));

    let previous = state.status;
    match state.handle_engine_line(&line) {
        EngineMessage::InfoUpdate(info) => {
            tracing::trace!("Received info: {:?}", info);
            let _ = event_tx.send(SessionEvent::Analysis(info));
        }
        EngineMessage::BestMove(mv) => {
            tracing::info!("Received bestmove: {}", mv);
            let _ = event_tx.send(SessionEvent::BestMove(mv));
        }
        EngineMessage::Unrecognized(raw) => {
            tracing::trace!("Unrecognized engine line: {}", raw);
            let _ = event_tx.send(SessionEvent::Unrecognized(raw));
        }
    }

    if state.status != previous {
        let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
    }
}

fn disconnect(
    state: &mut SessionState,
    engine: &mut Option<EngineHandle>,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    *engine = None;
    if state.status != SessionStatus::Disconnected {
        state.on_disconnected();
        let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
    }
}
