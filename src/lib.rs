//! Fixed-depth chess move selection.
//!
//! A position comes in as FEN, every legal move is searched to a fixed depth
//! with negamax and alpha-beta pruning over a material-only evaluation, and
//! the best move goes back out in SAN. Board rules (move generation, check
//! and mate detection, FEN and SAN) come from `shakmaty`.

pub mod error;
pub mod evaluation;
pub mod movegen;
pub mod position;
pub mod protocol;
pub mod search;
pub mod service;
pub mod types;

pub use error::{EngineError, EngineResult, TerminalKind};
pub use position::{BoardStatus, Position};
pub use search::{select_best_move, SearchState};
pub use service::{Engine, Request, Response};
pub use types::{EngineConfig, Score, SearchResult, SearchVariant, MAX_DEPTH, SCORE_INFINITY, SCORE_MATE};
