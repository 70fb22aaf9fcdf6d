use std::time::Duration;

use crate::{Board, Move, Result};

pub mod deepening;
pub mod ella;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod transposition;

pub use deepening::{SearchReport, SearchState};
pub use search::SearchResult;

/// Bounds for a single best-move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// deepest iteration to run, `0` is treated as `1`
    pub max_depth: u32,
    /// wall clock budget, `None` searches until `max_depth` is done
    pub time_limit: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: 3,
            time_limit: Some(Duration::from_secs(120)),
        }
    }
}

impl SearchLimits {
    pub fn new(max_depth: u32, time_limit: Duration) -> Self {
        SearchLimits {
            max_depth,
            time_limit: Some(time_limit),
        }
    }

    /// searches exactly to `max_depth` without a deadline
    pub fn depth_only(max_depth: u32) -> Self {
        SearchLimits {
            max_depth,
            time_limit: None,
        }
    }
}

/// Tunables that stay fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// the position counts as an endgame once the side with fewer non-king
    /// pieces has at most this many left
    pub endgame_threshold: usize,
    /// number of nodes between two deadline checks
    pub node_check_interval: u64,
    /// size of the transposition table in MiB
    pub hash_size_mb: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            endgame_threshold: 4,
            node_check_interval: 1024,
            hash_size_mb: 1,
        }
    }
}

pub trait Engine {
    /// creates a new engine in the given position
    fn new_from_board(board: Board) -> Self;

    /// the current position
    fn board(&self) -> &Board;

    /// advance the position by `mve` and return the new zobrist hash.
    /// Illegal moves are rejected and leave the position untouched.
    fn accept_move(&mut self, mve: Move) -> Result<u64>;

    /// searches the current position for the best move within `limits`.
    /// This fails only if the side to move has no legal move at all.
    fn find_best_move(&mut self, limits: &SearchLimits) -> Result<SearchReport>;
}
