//! Error types for move selection.
//!
//! Every failure is detected locally and reported once at the request
//! boundary. Nothing is retried.

use std::fmt;

use thiserror::Error;

/// How a game already ended at the position handed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalKind {
    Checkmate,
    Stalemate,
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalKind::Checkmate => f.write_str("Checkmate"),
            TerminalKind::Stalemate => f.write_str("Stalemate"),
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Missing or unparseable FEN
    #[error("{0}")]
    InvalidInput(String),

    /// Position is already decided, nothing to search
    #[error("{0}")]
    TerminalPosition(TerminalKind),

    #[error("No legal moves available")]
    NoLegalMoves,

    /// Unexpected failure surfaced while searching
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn missing_fen() -> Self {
        EngineError::InvalidInput("FEN string is required".to_string())
    }

    /// HTTP-style status class: caller mistakes are 400, our own failures 500.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidInput(_)
            | EngineError::TerminalPosition(_)
            | EngineError::NoLegalMoves => 400,
            EngineError::Internal(_) => 500,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
