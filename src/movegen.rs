use arrayvec::ArrayVec;
use shakmaty::{Move, MoveList};

use crate::evaluation::piece_value;
use crate::position::Position;
use crate::types::Score;

#[derive(Clone, Debug)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: Score,
}

/// Heuristic guess at how good `mv` is, before any search.
/// Captures gain victim minus attacker, promotions gain the new piece, and a
/// piece landing where an enemy pawn can take it loses its own value.
pub fn score_move(pos: &mut Position, mv: &Move) -> Score {
    let mover = mv.role();
    let mut score: Score = 0;

    if let Some(victim) = mv.capture() {
        score += piece_value(victim) - piece_value(mover);
    }
    if let Some(promoted) = mv.promotion() {
        score += piece_value(promoted);
    }

    let us = pos.turn();
    let child = pos.apply(mv.clone());
    if child.attacked_by_pawn(mv.to(), us.other()) {
        score -= piece_value(mover);
    }

    score
}

/// Orders moves for search, best guess first. Equal scores keep their
/// generation order, so the result is deterministic.
pub fn order_moves(pos: &mut Position, moves: MoveList) -> ArrayVec<ScoredMove, 256> {
    let mut scored: ArrayVec<ScoredMove, 256> = ArrayVec::new();

    for mv in moves {
        let score = score_move(pos, &mv);
        scored.push(ScoredMove { mv, score });
    }

    // stable: ties stay in generation order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Generates the legal moves of `pos` and orders them.
pub fn ordered_legal_moves(pos: &mut Position) -> ArrayVec<ScoredMove, 256> {
    let moves = pos.legal_moves();
    order_moves(pos, moves)
}


// Ordering only affects how much alpha-beta can prune, never the score the
// search returns.
// 1. Captures: victim value - attacker value (MVV-LVA without the x10 weighting)
// 2. Promotions: + value of the promoted piece
// 3. One-ply look-ahead: - mover value if an enemy pawn attacks the destination
// Ties keep move-generation order (stable sort).
