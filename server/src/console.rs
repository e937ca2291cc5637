//! Line-oriented console front end.
//!
//! Each input line maps to one session intent; output lines summarise the
//! observable session state.

use crate::session::{SessionEvent, SessionSnapshot, TeiDirection};
use engine::AnalysisSnapshot;

pub const USAGE: &str = "commands: go [tps] | stop | next | undo | reset | restart | log | status | quit
  a bare `go` re-analyses the current position as a new base; applied moves can no longer be undone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Analyse the given position text, or the current position when `None`.
    Go(Option<String>),
    Stop,
    Next,
    Undo,
    Reset,
    Restart,
    /// Toggle printing of raw protocol traffic.
    Log,
    Status,
    Quit,
}

/// Parse one console line. `None` for blank or unknown input.
pub fn parse_console_input(line: &str) -> Option<ConsoleInput> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word {
        "go" if rest.is_empty() => ConsoleInput::Go(None),
        "go" => ConsoleInput::Go(Some(rest.to_string())),
        "stop" => ConsoleInput::Stop,
        "next" => ConsoleInput::Next,
        "undo" => ConsoleInput::Undo,
        "reset" => ConsoleInput::Reset,
        "restart" => ConsoleInput::Restart,
        "log" => ConsoleInput::Log,
        "status" => ConsoleInput::Status,
        "quit" | "exit" => ConsoleInput::Quit,
        _ => return None,
    };
    Some(input)
}

pub fn render_analysis(analysis: &AnalysisSnapshot) -> String {
    format!(
        "Evaluation: {}% | Main line: {} | {} nps",
        analysis.evaluation_percent(),
        analysis.pv.join(" "),
        analysis.nps.unwrap_or(0)
    )
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = format!("[{}] {}", snapshot.status, snapshot.position);
    if snapshot.base != snapshot.position {
        out.push_str(&format!("\nBase: {}", snapshot.base));
    }
    out.push('\n');
    out.push_str(&render_analysis(&snapshot.analysis));

    let mut actions = Vec::new();
    if let Some(ref mv) = snapshot.next_move {
        actions.push(format!("next: continue with {}", mv));
    }
    if let Some(last) = snapshot.moves.last().filter(|_| snapshot.can_undo) {
        actions.push(format!("undo: take back {}", last));
    }
    if snapshot.can_reset {
        actions.push("reset: back to base TPS".to_string());
    }
    if !actions.is_empty() {
        out.push('\n');
        out.push_str(&actions.join(" | "));
    }
    out
}

/// Console line for an event, if it is worth printing.
///
/// With `show_log` set, commands sent to the engine print as `>> line` and
/// engine output the decoder didn't understand prints as `<< line`. Decoded
/// engine lines already show up as analysis or bestmove output.
pub fn render_event(event: &SessionEvent, show_log: bool) -> Option<String> {
    match event {
        SessionEvent::StateChanged(snapshot) => Some(render_snapshot(snapshot)),
        SessionEvent::Analysis(analysis) => Some(render_analysis(analysis)),
        SessionEvent::BestMove(mv) => Some(format!("bestmove {}", mv)),
        SessionEvent::Unrecognized(raw) if show_log => Some(format!("<< {}", raw)),
        SessionEvent::TeiMessage(entry) if show_log => match entry.direction {
            TeiDirection::ToEngine => Some(format!(">> {}", entry.line)),
            TeiDirection::FromEngine => None,
        },
        SessionEvent::Unrecognized(_) | SessionEvent::TeiMessage(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStatus, TeiLogEntry};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            base: "x6/x6/x6/x6/x6/x6 1 1".to_string(),
            position: "x6/x6/x6/x6/x6/x6 1 1 moves a1".to_string(),
            moves: vec!["a1".to_string()],
            status: SessionStatus::Thinking,
            analysis: AnalysisSnapshot {
                pv: vec!["f6".to_string(), "b2".to_string()],
                nps: Some(1000),
                score: Some(50),
                ..Default::default()
            },
            evaluation_percent: 75.0,
            best_move: None,
            next_move: Some("f6".to_string()),
            can_apply_next: true,
            can_undo: true,
            can_reset: true,
            initialized: true,
        }
    }

    #[test]
    fn test_parse_console_input() {
        assert_eq!(parse_console_input("go"), Some(ConsoleInput::Go(None)));
        assert_eq!(
            parse_console_input("go  x6/x6/x6/x6/x6/x6 1 1 "),
            Some(ConsoleInput::Go(Some("x6/x6/x6/x6/x6/x6 1 1".to_string())))
        );
        assert_eq!(parse_console_input(" next"), Some(ConsoleInput::Next));
        assert_eq!(parse_console_input("exit"), Some(ConsoleInput::Quit));
        assert_eq!(parse_console_input("log"), Some(ConsoleInput::Log));
        assert_eq!(parse_console_input(""), None);
        assert_eq!(parse_console_input("castle"), None);
    }

    #[test]
    fn test_render_snapshot() {
        let out = render_snapshot(&snapshot());
        assert!(out.starts_with("[Calculating...] x6/x6/x6/x6/x6/x6 1 1 moves a1"));
        assert!(out.contains("Evaluation: 75%"));
        assert!(out.contains("Main line: f6 b2"));
        assert!(out.contains("1000 nps"));
        assert!(out.contains("next: continue with f6"));
        assert!(out.contains("undo: take back a1"));
        assert!(out.contains("\nBase: x6/x6/x6/x6/x6/x6 1 1\n"));
    }

    #[test]
    fn test_render_snapshot_hides_base_without_moves() {
        let mut snap = snapshot();
        snap.position = snap.base.clone();
        snap.moves.clear();
        assert!(!render_snapshot(&snap).contains("Base:"));
    }

    #[test]
    fn test_usage_explains_bare_go() {
        assert!(USAGE.contains("bare `go`"));
        assert!(USAGE.contains("no longer be undone"));
    }

    #[test]
    fn test_render_event_skips_protocol_noise() {
        assert!(render_event(&SessionEvent::Unrecognized("teiok".to_string()), false).is_none());
        let sent = SessionEvent::TeiMessage(TeiLogEntry {
            direction: TeiDirection::ToEngine,
            line: "stop".to_string(),
        });
        assert!(render_event(&sent, false).is_none());
        assert_eq!(
            render_event(&SessionEvent::BestMove("a1".to_string()), false).as_deref(),
            Some("bestmove a1")
        );
    }

    #[test]
    fn test_render_event_with_log() {
        let sent = SessionEvent::TeiMessage(TeiLogEntry {
            direction: TeiDirection::ToEngine,
            line: "go movetime 1000000".to_string(),
        });
        assert_eq!(
            render_event(&sent, true).as_deref(),
            Some(">> go movetime 1000000")
        );

        let received = SessionEvent::TeiMessage(TeiLogEntry {
            direction: TeiDirection::FromEngine,
            line: "teiok".to_string(),
        });
        assert!(render_event(&received, true).is_none());
        assert_eq!(
            render_event(&SessionEvent::Unrecognized("teiok".to_string()), true).as_deref(),
            Some("<< teiok")
        );
    }
}
