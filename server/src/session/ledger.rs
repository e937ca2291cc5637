/// Base position plus the moves applied on top of it.
///
/// Moves are opaque engine tokens; nothing here checks legality. The list is
/// only ever appended to, popped, or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    base: String,
    moves: Vec<String>,
}

impl Ledger {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            moves: Vec::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Position string for `position tps`.
    ///
    /// A base that already carries its own `moves` list gets further moves
    /// appended to that list rather than a second marker.
    pub fn render(&self) -> String {
        if self.moves.is_empty() {
            return self.base.clone();
        }
        let separator = if has_move_list(&self.base) {
            " "
        } else {
            " moves "
        };
        format!("{}{}{}", self.base, separator, self.moves.join(" "))
    }

    pub fn append(&mut self, mv: impl Into<String>) {
        self.moves.push(mv.into());
    }

    /// Drop the most recent move. Returns false when there was none.
    pub fn undo_last(&mut self) -> bool {
        self.moves.pop().is_some()
    }

    pub fn reset_to_base(&mut self) {
        self.moves.clear();
    }

    /// Replace the base (e.g. after the user edited the position text).
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = base.into();
        self.moves.clear();
    }
}

fn has_move_list(position: &str) -> bool {
    position.split_whitespace().any(|token| token == "moves")
}
