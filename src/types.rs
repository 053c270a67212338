use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use shakmaty::Move;

use crate::error::{EngineError, EngineResult};

pub type Score = i32;

/// Bound of the root search window. Never returned as a node score.
pub const SCORE_INFINITY: Score = 30_000;
/// Forced win for the side the score is relative to. Negated, a forced loss.
pub const SCORE_MATE: Score = 29_000;
pub const DEFAULT_DEPTH: u8 = 3;
pub const MINIMAX_DEFAULT_DEPTH: u8 = 2;
/// Deepest search a request may ask for. The search cannot be interrupted.
pub const MAX_DEPTH: u8 = 5;

/// Accepts a search depth in `1..=MAX_DEPTH`.
pub fn check_depth(depth: u8) -> EngineResult<u8> {
    if (1..=MAX_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(EngineError::InvalidInput(format!(
            "Depth must be between 1 and {MAX_DEPTH}, got {depth}"
        )))
    }
}

/// Which move selector a request runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchVariant {
    /// Uniformly random legal move.
    Random,
    /// Full-width negamax, no pruning, no ordering.
    Minimax,
    /// Negamax w/ alpha-beta pruning and move ordering.
    #[default]
    AlphaBeta,
}

impl SearchVariant {
    pub fn default_depth(self) -> u8 {
        match self {
            SearchVariant::Random => 0,
            SearchVariant::Minimax => MINIMAX_DEFAULT_DEPTH,
            SearchVariant::AlphaBeta => DEFAULT_DEPTH,
        }
    }
}

impl fmt::Display for SearchVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchVariant::Random => "random",
            SearchVariant::Minimax => "minimax",
            SearchVariant::AlphaBeta => "alpha_beta",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub variant: SearchVariant,
    /// Overrides the variant's default depth when set.
    pub depth: Option<u8>,
}

impl EngineConfig {
    pub fn depth(&self) -> u8 {
        self.depth.unwrap_or_else(|| self.variant.default_depth())
    }
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
}
