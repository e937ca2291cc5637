use engine::tei::{go_command, initialization_commands, position_command, stop_command};
use engine::{parse_tei_message, AnalysisSnapshot, EngineMessage, TeiCommand, TeiSettings};

use super::ledger::Ledger;
use super::snapshot::{SessionSnapshot, SessionStatus};

/// Internal mutable state, owned entirely by the session actor. No locks.
///
/// Intents return the commands to transmit, in order; the caller is
/// responsible for delivering them to the engine without reordering.
pub(crate) struct SessionState {
    pub settings: TeiSettings,
    pub ledger: Ledger,
    pub status: SessionStatus,
    pub analysis: AnalysisSnapshot,
    pub best_move: Option<String>,
    /// Handshake sent on the current engine connection.
    pub initialized: bool,
}

impl SessionState {
    pub fn new(settings: TeiSettings, base: impl Into<String>) -> Self {
        Self {
            settings,
            ledger: Ledger::new(base),
            status: SessionStatus::Idle,
            analysis: AnalysisSnapshot::default(),
            best_move: None,
            initialized: false,
        }
    }

    /// Build a full snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let next_move = self.analysis.best_line_move().map(str::to_string);
        let has_moves = !self.ledger.moves().is_empty();

        SessionSnapshot {
            base: self.ledger.base().to_string(),
            position: self.ledger.render(),
            moves: self.ledger.moves().to_vec(),
            status: self.status,
            analysis: self.analysis.clone(),
            evaluation_percent: self.analysis.evaluation_percent(),
            best_move: self.best_move.clone(),
            can_apply_next: next_move.is_some(),
            next_move,
            can_undo: has_moves,
            can_reset: has_moves,
            initialized: self.initialized,
        }
    }

    /// Analyse the given text from scratch. The whole text becomes the new base.
    pub fn request_analysis(&mut self, input: &str) -> Vec<TeiCommand> {
        self.ledger.set_base(input.trim());
        self.restart_search()
    }

    /// Play the first move of the current principal variation and re-analyse.
    pub fn apply_best_principal_move(&mut self) -> Vec<TeiCommand> {
        let Some(mv) = self.analysis.best_line_move().map(str::to_string) else {
            return Vec::new();
        };
        self.ledger.append(mv);
        self.restart_search()
    }

    /// Take back the last applied move. Empty when there was nothing to undo.
    pub fn undo(&mut self) -> Vec<TeiCommand> {
        if !self.ledger.undo_last() {
            return Vec::new();
        }
        self.restart_search()
    }

    pub fn reset_to_base(&mut self) -> Vec<TeiCommand> {
        self.ledger.reset_to_base();
        self.restart_search()
    }

    /// Stopping is only a request; status changes when `bestmove` arrives.
    pub fn stop(&self) -> Vec<TeiCommand> {
        if self.status == SessionStatus::Disconnected {
            return Vec::new();
        }
        vec![stop_command()]
    }

    /// stop (if searching), position, go. Prefixed by the handshake the
    /// first time round on a connection.
    fn restart_search(&mut self) -> Vec<TeiCommand> {
        if self.status == SessionStatus::Disconnected {
            tracing::debug!("Engine disconnected, not searching {}", self.ledger.render());
            return Vec::new();
        }

        let mut commands = Vec::new();
        if !self.initialized {
            commands.extend(initialization_commands(&self.settings));
            self.initialized = true;
        }
        if self.status == SessionStatus::Thinking {
            commands.push(stop_command());
        }
        commands.push(position_command(&self.ledger.render()));
        commands.push(go_command(self.settings.movetime));

        self.status = SessionStatus::Thinking;
        commands
    }

    /// Decode one engine line and fold it into the state.
    pub fn handle_engine_line(&mut self, line: &str) -> EngineMessage {
        let message = parse_tei_message(line);
        self.apply_engine_message(&message);
        message
    }

    pub fn apply_engine_message(&mut self, message: &EngineMessage) {
        match message {
            EngineMessage::InfoUpdate(info) => {
                self.analysis = info.clone();
                // an info line means the engine is searching, whatever we thought,
                // unless the transport is already gone
                if self.status != SessionStatus::Disconnected {
                    self.status = SessionStatus::Thinking;
                }
            }
            EngineMessage::BestMove(mv) => {
                self.best_move = Some(mv.clone());
                self.status = SessionStatus::Idle;
            }
            EngineMessage::Unrecognized(_) => {}
        }
    }

    pub fn on_disconnected(&mut self) {
        self.status = SessionStatus::Disconnected;
    }

    /// A fresh engine needs the handshake again.
    pub fn on_reconnected(&mut self) {
        self.initialized = false;
        self.status = SessionStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_6X6: &str = "x6/x6/x6/x6/x6/x6 1 1";

    fn lines(commands: &[TeiCommand]) -> Vec<String> {
        commands.iter().map(ToString::to_string).collect()
    }

    fn test_state() -> SessionState {
        SessionState::new(TeiSettings::default(), EMPTY_6X6)
    }

    #[test]
    fn test_snapshot_initial() {
        let snap = test_state().snapshot();
        assert_eq!(snap.status, SessionStatus::Idle);
        assert_eq!(snap.position, EMPTY_6X6);
        assert_eq!(snap.evaluation_percent, 50.0);
        assert!(!snap.can_apply_next);
        assert!(!snap.can_undo);
        assert!(!snap.initialized);
    }

    #[test]
    fn test_first_request_initializes() {
        let mut state = test_state();
        let commands = state.request_analysis(EMPTY_6X6);
        assert_eq!(
            lines(&commands),
            vec![
                "tei",
                "teinewgame 6",
                "setoption name HalfKomi value 4",
                "position tps x6/x6/x6/x6/x6/x6 1 1",
                "go movetime 1000000",
            ]
        );
        assert_eq!(state.status, SessionStatus::Thinking);
        assert!(state.initialized);
    }

    #[test]
    fn test_request_while_thinking_stops_first() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        let commands = state.request_analysis("x6/x6/x6/x6/x6/x6 2 1");
        assert_eq!(
            lines(&commands),
            vec![
                "stop",
                "position tps x6/x6/x6/x6/x6/x6 2 1",
                "go movetime 1000000",
            ]
        );
    }

    #[test]
    fn test_request_when_idle_skips_stop() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.handle_engine_line("bestmove a1");
        let commands = state.request_analysis(EMPTY_6X6);
        assert_eq!(lines(&commands)[0], "position tps x6/x6/x6/x6/x6/x6 1 1");
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_request_after_stop_sends_stop_again() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        assert_eq!(lines(&state.stop()), vec!["stop"]);

        // no bestmove arrived, so the session still counts as searching
        let commands = state.request_analysis(EMPTY_6X6);
        assert_eq!(
            lines(&commands),
            vec![
                "stop",
                "position tps x6/x6/x6/x6/x6/x6 1 1",
                "go movetime 1000000"
            ]
        );
    }

    #[test]
    fn test_request_trims_input() {
        let mut state = test_state();
        state.request_analysis("  x6/x6/x6/x6/x6/x6 1 1 \n");
        assert_eq!(state.ledger.base(), EMPTY_6X6);
    }

    #[test]
    fn test_info_replaces_analysis() {
        let mut state = test_state();
        state.handle_engine_line("info pv a1 b1 nps 1000 score 50");
        state.handle_engine_line("info pv c3");
        assert_eq!(state.analysis.pv, vec!["c3"]);
        assert_eq!(state.analysis.nps, None);
        assert_eq!(state.analysis.score, None);
    }

    #[test]
    fn test_info_while_idle_means_thinking() {
        let mut state = test_state();
        state.handle_engine_line("info nps 10");
        assert_eq!(state.status, SessionStatus::Thinking);
    }

    #[test]
    fn test_bestmove_goes_idle() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        let message = state.handle_engine_line("bestmove e5");
        assert_eq!(message, EngineMessage::BestMove("e5".to_string()));
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.best_move.as_deref(), Some("e5"));

        // regardless of prior status
        state.handle_engine_line("bestmove e5");
        assert_eq!(state.status, SessionStatus::Idle);
    }

    #[test]
    fn test_bestmove_does_not_touch_pv() {
        let mut state = test_state();
        state.handle_engine_line("info pv a1 b2");
        state.handle_engine_line("bestmove c3");
        assert_eq!(state.analysis.pv, vec!["a1", "b2"]);
    }

    #[test]
    fn test_unrecognized_changes_nothing() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        let before = state.snapshot();
        let message = state.handle_engine_line("teiok");
        assert_eq!(message, EngineMessage::Unrecognized("teiok".to_string()));
        assert_eq!(state.status, before.status);
        assert_eq!(state.analysis, before.analysis);
    }

    #[test]
    fn test_apply_best_move_with_empty_pv_is_noop() {
        let mut state = test_state();
        assert!(state.apply_best_principal_move().is_empty());
        assert_eq!(state.status, SessionStatus::Idle);
        assert!(state.ledger.moves().is_empty());
    }

    #[test]
    fn test_apply_best_move_while_thinking_stops_first() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.handle_engine_line("info pv a1 b1");
        assert_eq!(state.status, SessionStatus::Thinking);

        let commands = state.apply_best_principal_move();
        assert_eq!(
            lines(&commands),
            vec![
                "stop",
                "position tps x6/x6/x6/x6/x6/x6 1 1 moves a1",
                "go movetime 1000000"
            ]
        );
        assert_eq!(state.ledger.moves().to_vec(), vec!["a1".to_string()]);
    }

    #[test]
    fn test_undo_with_no_moves_is_noop() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.handle_engine_line("bestmove a1");
        assert!(state.undo().is_empty());
        assert_eq!(state.status, SessionStatus::Idle);
    }

    #[test]
    fn test_undo_reissues_search() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.handle_engine_line("info pv a1");
        state.apply_best_principal_move();
        let commands = state.undo();
        assert_eq!(
            lines(&commands),
            vec!["stop", "position tps x6/x6/x6/x6/x6/x6 1 1", "go movetime 1000000"]
        );
    }

    #[test]
    fn test_reset_always_restarts() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.handle_engine_line("bestmove a1");
        let commands = state.reset_to_base();
        assert_eq!(
            lines(&commands),
            vec!["position tps x6/x6/x6/x6/x6/x6 1 1", "go movetime 1000000"]
        );
        assert_eq!(state.status, SessionStatus::Thinking);
    }

    #[test]
    fn test_stop_keeps_status() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        assert_eq!(lines(&state.stop()), vec!["stop"]);
        assert_eq!(state.status, SessionStatus::Thinking);

        let idle = test_state();
        assert_eq!(lines(&idle.stop()), vec!["stop"]);
    }

    #[test]
    fn test_end_to_end() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        assert_eq!(state.status, SessionStatus::Thinking);

        state.handle_engine_line("info pv a1 nps 1000 score 50");
        let snap = state.snapshot();
        assert_eq!(snap.evaluation_percent, 75.0);
        assert_eq!(snap.analysis.nps, Some(1000));
        assert_eq!(snap.next_move.as_deref(), Some("a1"));

        state.handle_engine_line("bestmove a1");
        assert_eq!(state.status, SessionStatus::Idle);

        let commands = state.apply_best_principal_move();
        assert_eq!(state.ledger.render(), "x6/x6/x6/x6/x6/x6 1 1 moves a1");
        assert_eq!(
            lines(&commands),
            vec![
                "position tps x6/x6/x6/x6/x6/x6 1 1 moves a1",
                "go movetime 1000000"
            ]
        );
        assert!(state.snapshot().can_undo);
    }

    #[test]
    fn test_disconnected_keeps_ledger_but_sends_nothing() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.on_disconnected();

        assert!(state.request_analysis("x5/x5/x5/x5/x5 1 1").is_empty());
        assert!(state.stop().is_empty());
        assert_eq!(state.ledger.base(), "x5/x5/x5/x5/x5 1 1");
        assert_eq!(state.status, SessionStatus::Disconnected);
    }

    #[test]
    fn test_info_while_disconnected_stays_disconnected() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.on_disconnected();

        state.handle_engine_line("info pv a1 score 10");
        assert_eq!(state.status, SessionStatus::Disconnected);
        assert_eq!(state.analysis.pv, vec!["a1"]);
    }

    #[test]
    fn test_reconnect_repeats_handshake() {
        let mut state = test_state();
        state.request_analysis(EMPTY_6X6);
        state.on_disconnected();
        state.on_reconnected();
        assert_eq!(state.status, SessionStatus::Idle);

        let commands = state.request_analysis(EMPTY_6X6);
        assert_eq!(lines(&commands)[0], "tei");
        assert_eq!(commands.len(), 5);
    }
}
