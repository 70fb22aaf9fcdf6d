//! Iterative deepening on top of [Search].

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::{
    eval,
    ordering::MoveOrderer,
    search::{self, Search, SearchResult, TimedOut},
    transposition::TranspositionTable,
    EngineOptions, SearchLimits,
};
use crate::{Board, ChessError, GameOutcome, Move, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching { depth: u32 },
    /// every depth up to the limit finished
    Completed,
    /// the deadline cut the search short
    Exhausted,
}

/// Everything a caller gets back from a best-move request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best_move: Move,
    /// centipawns from the point of view of the side to move
    pub score: i32,
    /// nodes of all completed depths, the work of an aborted depth is not counted
    pub nodes: u64,
    /// deepest completed depth, `0` if not even depth 1 finished
    pub depth: u32,
    pub iterations: Vec<SearchResult>,
    pub state: SearchState,
    pub endgame: bool,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn is_mate(&self) -> bool {
        search::is_mate_score(self.score)
    }
}

#[derive(Debug)]
pub struct IterativeDeepening {
    state: SearchState,
}

impl Default for IterativeDeepening {
    fn default() -> Self {
        Self::new()
    }
}

impl IterativeDeepening {
    pub fn new() -> Self {
        IterativeDeepening {
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    fn transition(&mut self, next: SearchState) {
        debug!("search state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Searches depth 1, 2, ... until `limits.max_depth` is done or the
    /// deadline passes, and reports the deepest completed depth.
    ///
    /// A move is returned whenever the side to move has one, even if the
    /// deadline passed before depth 1 was done.
    pub fn run(
        &mut self,
        board: &Board,
        limits: &SearchLimits,
        endgame: bool,
        options: &EngineOptions,
        transpositions: &mut TranspositionTable,
    ) -> Result<SearchReport> {
        let start = Instant::now();

        if let Some(outcome) = board.outcome() {
            debug!("no legal move in {}: {outcome}", board.generate_fen());
            return Err(ChessError::NoMoveFound(outcome));
        }

        let max_depth = if limits.max_depth == 0 {
            warn!("max depth 0 requested, searching depth 1");
            1
        } else {
            limits.max_depth
        };
        // a budget too large for an Instant is no budget at all
        let deadline = limits
            .time_limit
            .and_then(|limit| start.checked_add(limit));

        transpositions.new_search();
        let mut search = Search::new(
            transpositions,
            deadline,
            options.node_check_interval,
            endgame,
        );

        let mut iterations = Vec::new();
        let mut best: Option<(Move, i32, u32)> = None;
        let mut nodes = 0;

        for depth in 1..=max_depth {
            self.transition(SearchState::Searching { depth });

            match search.search_to_depth(board, depth) {
                Ok(result) => {
                    debug!(
                        "depth {depth}: best {:?} score {} nodes {}",
                        result.best_move.map(|m| m.to_uci()),
                        result.score,
                        result.nodes
                    );
                    nodes += result.nodes;
                    if let Some(mve) = result.best_move {
                        best = Some((mve, result.score, depth));
                    }
                    iterations.push(result);
                }
                Err(TimedOut) => {
                    debug!("depth {depth} timed out after {} nodes", search.nodes());
                    if best.is_none() {
                        // depth 1 never finished, fall back to what is safe
                        best = search
                            .partial_best()
                            .or_else(|| fallback_move(board, endgame))
                            .map(|(mve, score)| (mve, score, 0));
                    }
                    self.transition(SearchState::Exhausted);
                    break;
                }
            }
        }

        if self.state != SearchState::Exhausted {
            self.transition(SearchState::Completed);
        }

        let (best_move, score, depth) = best.ok_or_else(|| {
            ChessError::NoMoveFound(board.outcome().unwrap_or(GameOutcome::Stalemate))
        })?;

        let elapsed = start.elapsed();
        info!(
            "best move {best_move} score {score} at depth {depth}, {nodes} nodes in {elapsed:?}"
        );

        Ok(SearchReport {
            best_move,
            score,
            nodes,
            depth,
            iterations,
            state: self.state,
            endgame,
            elapsed,
        })
    }
}

/// Runs a fresh [IterativeDeepening] controller.
pub fn iterative_deepening(
    board: &Board,
    limits: &SearchLimits,
    endgame: bool,
    options: &EngineOptions,
    transpositions: &mut TranspositionTable,
) -> Result<SearchReport> {
    IterativeDeepening::new().run(board, limits, endgame, options, transpositions)
}

/// first move in search order, scored by a static look at the resulting position
fn fallback_move(board: &Board, endgame: bool) -> Option<(Move, i32)> {
    let moves = board.legal_moves();
    let mve = *MoveOrderer::new().order_moves(board, &moves, None).first()?;
    let mut child = board.clone();
    child.play_move(mve);
    let score = -eval::evaluate_relative(&child, endgame);
    warn!("no depth finished in time, falling back to {mve}");
    Some((mve, score))
}
