use shakmaty::{Board, Color, Role};

use crate::types::Score;

/// Material value per role, indexed by `role_index`. Shared by evaluation and
/// move ordering so the two never disagree.
pub const PIECE_VALUES: [Score; 6] = [100, 300, 300, 500, 900, 0];

fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

pub fn piece_value(role: Role) -> Score {
    PIECE_VALUES[role_index(role)]
}

/// Sum of piece values held by `color`
pub fn material(board: &Board, color: Color) -> Score {
    let ours = board.by_color(color);
    Role::ALL
        .into_iter()
        .map(|role| (ours & board.by_role(role)).count() as Score * piece_value(role))
        .sum()
}

/// Material balance from the point of view of `perspective`.
/// Antisymmetric: `evaluate(b, White) == -evaluate(b, Black)`.
pub fn evaluate(board: &Board, perspective: Color) -> Score {
    material(board, perspective) - material(board, perspective.other())
}


// Pure material count: no piece-square tables, no mobility, no king safety.
// Kings are worth 0 because both sides always have exactly one; mate is
// scored by the search, never by the evaluator.
