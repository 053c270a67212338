use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{attacks, Board, CastlingMode, Chess, Color, Move, MoveList, Position as _, Role, Square};

use crate::error::{EngineError, EngineResult, TerminalKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
}

impl BoardStatus {
    /// Terminal kinds the engine refuses to search from.
    pub fn terminal_kind(self) -> Option<TerminalKind> {
        match self {
            BoardStatus::Checkmate => Some(TerminalKind::Checkmate),
            BoardStatus::Stalemate => Some(TerminalKind::Stalemate),
            BoardStatus::Ongoing | BoardStatus::InsufficientMaterial => None,
        }
    }
}

/// Request-scoped mutable position. Moves are pushed and popped in place;
/// every push keeps the previous state on a stack so pop restores it exactly.
#[derive(Clone, Debug, Default)]
pub struct Position {
    current: Chess,
    history: Vec<Chess>,
}

impl Position {
    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(EngineError::missing_fen());
        }
        let parsed: Fen = fen
            .parse()
            .map_err(|e| EngineError::InvalidInput(format!("Invalid FEN '{fen}': {e}")))?;
        let current: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::InvalidInput(format!("Illegal position '{fen}': {e}")))?;
        Ok(Self { current, history: Vec::new() })
    }

    pub fn board(&self) -> &Board {
        self.current.board()
    }

    pub fn turn(&self) -> Color {
        self.current.turn()
    }

    pub fn legal_moves(&self) -> MoveList {
        self.current.legal_moves()
    }

    pub fn status(&self) -> BoardStatus {
        if self.current.is_checkmate() {
            BoardStatus::Checkmate
        } else if self.current.is_stalemate() {
            BoardStatus::Stalemate
        } else if self.current.is_insufficient_material() {
            BoardStatus::InsufficientMaterial
        } else {
            BoardStatus::Ongoing
        }
    }

    /// Number of moves currently pushed on top of the root position.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Plays `mv`, which must be legal in the current position.
    pub fn push(&mut self, mv: Move) {
        self.history.push(self.current.clone());
        self.current.play_unchecked(&mv);
    }

    /// Takes back the last pushed move. Returns false if nothing was pushed.
    pub fn pop(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }

    /// Pushes `mv` and returns a guard that pops it when dropped, on every
    /// exit path including unwinding.
    pub fn apply(&mut self, mv: Move) -> Applied<'_> {
        self.push(mv);
        Applied { pos: self }
    }

    /// Pops everything pushed so far, back to the root position.
    pub fn unwind(&mut self) {
        while self.pop() {}
    }

    /// True if a pawn of `attacker` attacks `sq`.
    pub fn attacked_by_pawn(&self, sq: Square, attacker: Color) -> bool {
        let board = self.board();
        let pawns = board.by_color(attacker) & board.by_role(Role::Pawn);
        // squares a defender's pawn on `sq` would hit are exactly where attacking pawns sit
        (attacks::pawn_attacks(attacker.other(), sq) & pawns).any()
    }

    /// SAN of a legal move in the current position, check suffix included.
    pub fn san(&self, mv: Move) -> String {
        SanPlus::from_move(self.current.clone(), &mv).to_string()
    }
}

/// A pushed move. Derefs to the position; pops the move on drop.
pub struct Applied<'a> {
    pos: &'a mut Position,
}

impl Deref for Applied<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.pos
    }
}

impl DerefMut for Applied<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.pos
    }
}

impl Drop for Applied<'_> {
    fn drop(&mut self) {
        self.pos.pop();
    }
}
