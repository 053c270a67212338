use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use shakmaty::{Color, Move};
use tracing::{debug, trace_span};

use crate::error::{EngineError, EngineResult};
use crate::evaluation::evaluate;
use crate::movegen::ordered_legal_moves;
use crate::position::{BoardStatus, Position};
use crate::types::{Score, SearchResult, SearchVariant, SCORE_INFINITY, SCORE_MATE};

/// Mutable search state shared across recursion
pub struct SearchState {
    pub nodes: u64,
    pub start_time: Instant,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            start_time: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.nodes = 0;
        self.start_time = Instant::now();
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Score of a node that ends the game, relative to `perspective`.
/// `None` if the game goes on.
fn terminal_score(pos: &Position, perspective: Color) -> Option<Score> {
    match pos.status() {
        // the side to move is mated
        BoardStatus::Checkmate => Some(if pos.turn() == perspective { -SCORE_MATE } else { SCORE_MATE }),
        BoardStatus::Stalemate | BoardStatus::InsufficientMaterial => Some(0),
        BoardStatus::Ongoing => None,
    }
}

/// Negamax w/ alpha-beta pruning and move ordering.
///
/// `perspective` is the side to move at this node and the score is relative
/// to it. The position is restored before returning.
pub fn negamax(
    pos: &mut Position,
    state: &mut SearchState,
    depth: u8,
    mut alpha: Score,
    beta: Score,
    perspective: Color,
) -> Score {
    debug_assert_eq!(pos.turn(), perspective);
    state.nodes += 1;

    if let Some(score) = terminal_score(pos, perspective) {
        return score;
    }
    if depth == 0 {
        return evaluate(pos.board(), perspective);
    }

    let moves = ordered_legal_moves(pos);
    let mut best_score = -SCORE_INFINITY;

    for scored_move in moves {
        let score = {
            let mut child = pos.apply(scored_move.mv);
            -negamax(&mut child, state, depth - 1, -beta, -alpha, perspective.other())
        };

        best_score = best_score.max(score);
        alpha = alpha.max(best_score);

        // Beta cutoff
        if alpha >= beta {
            break;
        }
    }

    best_score
}

/// Plain negamax over every legal move in generation order. Same scores as
/// `negamax`, only slower.
pub fn minimax(pos: &mut Position, state: &mut SearchState, depth: u8, perspective: Color) -> Score {
    debug_assert_eq!(pos.turn(), perspective);
    state.nodes += 1;

    if let Some(score) = terminal_score(pos, perspective) {
        return score;
    }
    if depth == 0 {
        return evaluate(pos.board(), perspective);
    }

    let mut best_score = -SCORE_INFINITY;
    for mv in pos.legal_moves() {
        let mut child = pos.apply(mv);
        let score = -minimax(&mut child, state, depth - 1, perspective.other());
        best_score = best_score.max(score);
    }
    best_score
}

/// Rejects positions that cannot be searched: already decided, or no moves.
fn check_searchable(pos: &Position) -> EngineResult<()> {
    if let Some(kind) = pos.status().terminal_kind() {
        return Err(EngineError::TerminalPosition(kind));
    }
    if pos.legal_moves().is_empty() {
        return Err(EngineError::NoLegalMoves);
    }
    Ok(())
}

/// Picks the root move with the highest negamax score. Ties go to the move
/// ordered first. The root always searches at least one ply, and the result
/// reports the depth actually searched.
pub fn select_best_move(pos: &mut Position, state: &mut SearchState, depth: u8) -> EngineResult<SearchResult> {
    check_searchable(pos)?;
    let depth = depth.max(1);
    let _span = trace_span!("select_best_move", depth).entered();

    let us = pos.turn();
    let moves = ordered_legal_moves(pos);
    let mut best: Option<(Move, Score)> = None;

    for scored_move in moves {
        let score = {
            let mut child = pos.apply(scored_move.mv.clone());
            -negamax(
                &mut child,
                state,
                depth - 1,
                -SCORE_INFINITY,
                SCORE_INFINITY,
                us.other(),
            )
        };

        if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
            best = Some((scored_move.mv, score));
        }
    }

    let (best_move, score) = best.ok_or(EngineError::NoLegalMoves)?;
    Ok(finish(pos, state, best_move, score, depth))
}

/// Root driver for the unpruned search.
pub fn select_best_move_minimax(pos: &mut Position, state: &mut SearchState, depth: u8) -> EngineResult<SearchResult> {
    check_searchable(pos)?;
    let depth = depth.max(1);
    let _span = trace_span!("select_best_move_minimax", depth).entered();

    let us = pos.turn();
    let mut best: Option<(Move, Score)> = None;

    for mv in pos.legal_moves() {
        let score = {
            let mut child = pos.apply(mv.clone());
            -minimax(&mut child, state, depth - 1, us.other())
        };
        if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
            best = Some((mv, score));
        }
    }

    let (best_move, score) = best.ok_or(EngineError::NoLegalMoves)?;
    Ok(finish(pos, state, best_move, score, depth))
}

/// Uniformly random legal move, no search.
pub fn random_move<R: Rng + ?Sized>(pos: &mut Position, state: &mut SearchState, rng: &mut R) -> EngineResult<SearchResult> {
    check_searchable(pos)?;
    state.nodes += 1;

    let moves = pos.legal_moves();
    let best_move = moves.choose(rng).cloned().ok_or(EngineError::NoLegalMoves)?;
    Ok(finish(pos, state, best_move, 0, 0))
}

/// Runs `variant` on `pos`. The position is left exactly as it was given.
pub fn search<R: Rng + ?Sized>(
    pos: &mut Position,
    state: &mut SearchState,
    variant: SearchVariant,
    depth: u8,
    rng: &mut R,
) -> EngineResult<SearchResult> {
    state.reset();
    match variant {
        SearchVariant::Random => random_move(pos, state, rng),
        SearchVariant::Minimax => select_best_move_minimax(pos, state, depth),
        SearchVariant::AlphaBeta => select_best_move(pos, state, depth),
    }
}

fn finish(pos: &Position, state: &SearchState, best_move: Move, score: Score, depth: u8) -> SearchResult {
    let elapsed = state.start_time.elapsed();
    debug!(
        best = %pos.san(best_move.clone()),
        score,
        depth,
        nodes = state.nodes,
        elapsed_ms = elapsed.as_millis() as u64,
        "search finished"
    );
    SearchResult {
        best_move,
        score,
        depth,
        nodes: state.nodes,
        elapsed,
    }
}


// Negamax: minimax written once, from the side to move. A child's score is
// negated on the way up and the (alpha, beta) window is swapped and negated on
// the way down.

// Alpha-beta: alpha is what the side to move can already force, beta what
// the opponent already holds elsewhere. Once alpha >= beta the opponent will
// never allow this node, so the remaining siblings are skipped. Fail-soft:
// the best score seen is returned, not the bound.

// Terminal nodes are checked before the depth limit so a mate delivered on
// the last ply still scores as mate. Stalemate and dead draws score 0.

// Push/pop: every child is visited through `Position::apply`, whose guard pops
// the move when it leaves scope. Cutoffs (`break`) and unwinding both restore
// the position.
