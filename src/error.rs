//! Error types for sessions and searches.

use std::fmt;

use thiserror::Error;

use crate::Color;

/// Terminal state of a position in which the side to move has no legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Color },
    Stalemate,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameOutcome::Stalemate => f.write_str("stalemate"),
        }
    }
}

/// Errors surfaced to whoever drives a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// The serialized position could not be parsed
    #[error("Malformed position: {0}")]
    MalformedInput(String),

    /// The move is not in the legal set of the current position
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// The side to move has no legal move at all
    #[error("No move found: {0}")]
    NoMoveFound(GameOutcome),
}

/// Result type alias for board and engine operations
pub type Result<T> = std::result::Result<T, ChessError>;
