//! Fixed depth negamax search with alpha-beta pruning.

use std::time::Instant;

use super::{eval, ordering::MoveOrderer, transposition::TranspositionTable};
use crate::{Board, Move};

/// Larger than any reachable score.
pub const INFINITY: i32 = 1_000_000;

/// Score of being mated at the root. A mate `ply` half moves away is worth
/// `MATE_SCORE - ply` to the winning side.
pub const MATE_SCORE: i32 = 100_000;

const MAX_MATE_PLY: i32 = 1_000;

/// Whether `score` announces a forced mate for either side.
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_SCORE - MAX_MATE_PLY
}

/// The deadline passed before the current depth was done. Nothing computed
/// in the aborted depth can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

/// Outcome of one completed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// centipawns from the point of view of the side to move
    pub score: i32,
    /// `None` only if the root has no legal move
    pub best_move: Option<Move>,
    pub nodes: u64,
    pub depth: u32,
}

pub struct Search<'a> {
    transpositions: &'a mut TranspositionTable,
    orderer: MoveOrderer,
    deadline: Option<Instant>,
    check_interval: u64,
    endgame: bool,
    nodes: u64,
    partial_best: Option<(Move, i32)>,
}

impl<'a> Search<'a> {
    pub fn new(
        transpositions: &'a mut TranspositionTable,
        deadline: Option<Instant>,
        check_interval: u64,
        endgame: bool,
    ) -> Self {
        Search {
            transpositions,
            orderer: MoveOrderer::new(),
            deadline,
            check_interval: check_interval.max(1),
            endgame,
            nodes: 0,
            partial_best: None,
        }
    }

    /// nodes visited by the current or last depth
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// The best root move whose subtree was searched completely before the
    /// current depth was aborted, with its score.
    pub fn partial_best(&self) -> Option<(Move, i32)> {
        self.partial_best
    }

    pub fn search_to_depth(&mut self, board: &Board, depth: u32) -> Result<SearchResult, TimedOut> {
        self.nodes = 0;
        self.partial_best = None;

        self.visit_node()?;

        let moves = board.legal_moves();
        if moves.is_empty() || depth == 0 {
            let score = if moves.is_empty() {
                self.terminal_score(board, 0)
            } else {
                eval::evaluate_relative(board, self.endgame)
            };
            return Ok(SearchResult {
                score,
                best_move: None,
                nodes: self.nodes,
                depth,
            });
        }

        let hash = board.zobrist_hash();
        let hash_move = self.transpositions.best_move(hash);
        let ordered = self.orderer.order_moves(board, &moves, hash_move);

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best_move = None;

        for mve in ordered {
            let mut child = board.clone();
            child.play_move(mve);

            let score = -self.alpha_beta(&child, depth - 1, 1, -beta, -alpha)?;
            if score > alpha {
                alpha = score;
                best_move = Some(mve);
                self.partial_best = Some((mve, score));
            }
        }

        if let Some(best_move) = best_move {
            self.transpositions.store(hash, depth, best_move);
        }

        Ok(SearchResult {
            score: alpha,
            best_move,
            nodes: self.nodes,
            depth,
        })
    }

    fn alpha_beta(
        &mut self,
        board: &Board,
        depth: u32,
        ply: i32,
        mut alpha: i32,
        beta: i32,
    ) -> Result<i32, TimedOut> {
        self.visit_node()?;

        if depth == 0 {
            if !board.has_legal_moves() {
                return Ok(self.terminal_score(board, ply));
            }
            return Ok(eval::evaluate_relative(board, self.endgame));
        }

        let moves = board.legal_moves();
        if moves.is_empty() {
            return Ok(self.terminal_score(board, ply));
        }

        let hash = board.zobrist_hash();
        let hash_move = self.transpositions.best_move(hash);
        let ordered = self.orderer.order_moves(board, &moves, hash_move);

        let mut best_move = None;
        for mve in ordered {
            let mut child = board.clone();
            child.play_move(mve);

            let score = -self.alpha_beta(&child, depth - 1, ply + 1, -beta, -alpha)?;
            if score >= beta {
                self.transpositions.store(hash, depth, mve);
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
                best_move = Some(mve);
            }
        }

        if let Some(best_move) = best_move {
            self.transpositions.store(hash, depth, best_move);
        }

        Ok(alpha)
    }

    /// score of a position without legal moves, for the side to move
    fn terminal_score(&self, board: &Board, ply: i32) -> i32 {
        if board.is_in_check(board.next_move()) {
            -(MATE_SCORE - ply)
        } else {
            0
        }
    }

    /// Counts the node and checks the deadline every `check_interval` nodes,
    /// starting with the very first one.
    #[inline]
    fn visit_node(&mut self) -> Result<(), TimedOut> {
        if self.nodes % self.check_interval == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return Err(TimedOut);
                }
            }
        }
        self.nodes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn search(fen: &str, depth: u32) -> SearchResult {
        let board = Board::from_fen(fen).unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut search = Search::new(&mut tt, None, 1024, false);
        search.search_to_depth(&board, depth).unwrap()
    }

    #[test]
    fn mate_in_one() {
        let result = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 1);
        assert_eq!(result.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
        assert_eq!(result.score, MATE_SCORE - 1);
        assert!(is_mate_score(result.score));
    }

    #[test]
    fn mate_in_one_deeper() {
        for depth in 1..=3 {
            let result = search(
                "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
                depth,
            );
            assert_eq!(
                result.best_move.map(|m| m.to_uci()),
                Some("f3f7".to_string()),
                "depth {depth}"
            );
            assert_eq!(result.score, MATE_SCORE - 1);
        }
    }

    #[test]
    fn sees_getting_mated() {
        // every black move but g6/g5 or h6/h5 allows Ra8#, the search must
        // not report a mate against black at depth 2
        let result = search("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1", 2);
        assert!(!is_mate_score(result.score), "{result:?}");
    }

    #[test]
    fn terminal_root() {
        let mated = search("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", 3);
        assert_eq!(mated.best_move, None);
        assert_eq!(mated.score, -MATE_SCORE);

        let stalemate = search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(stalemate.best_move, None);
        assert_eq!(stalemate.score, 0);
    }

    #[test]
    fn counts_every_node() {
        let board = Board::start_position();
        let mut tt = TranspositionTable::new(1);
        let mut search = Search::new(&mut tt, None, 1024, false);

        let depth_1 = search.search_to_depth(&board, 1).unwrap();
        assert_eq!(depth_1.nodes, 21);

        let depth_2 = search.search_to_depth(&board, 2).unwrap();
        // the root, all 20 moves and at least all replies to the first one
        assert!(depth_2.nodes > 20 + 20, "{}", depth_2.nodes);
        assert!(depth_2.score.abs() < 100);
    }

    #[test]
    fn expired_deadline_times_out_on_first_node() {
        let board = Board::start_position();
        let mut tt = TranspositionTable::new(1);
        let mut search = Search::new(&mut tt, Some(Instant::now()), 1024, false);
        assert_eq!(search.search_to_depth(&board, 3), Err(TimedOut));
        assert_eq!(search.nodes(), 0);
        assert_eq!(search.partial_best(), None);
    }

    #[test]
    fn partial_best_survives_timeout() {
        let board = Board::start_position();
        let mut tt = TranspositionTable::new(1);
        let deadline = Instant::now() + Duration::from_millis(50);
        // check every node so the deadline is seen as soon as it passes
        let mut search = Search::new(&mut tt, Some(deadline), 1, false);

        // deep enough to never finish in time
        match search.search_to_depth(&board, 8) {
            Err(TimedOut) => {
                if let Some((mve, _)) = search.partial_best() {
                    assert!(board.is_legal(mve));
                }
            }
            Ok(result) => panic!("depth 8 finished in 50ms: {result:?}"),
        }
    }

    #[test]
    fn move_order_does_not_change_score() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let board = Board::from_fen(fen).unwrap();

        let mut warm = TranspositionTable::new(1);
        let mut search = Search::new(&mut warm, None, 1024, false);
        search.search_to_depth(&board, 2).unwrap();
        // the table now holds hash moves from depth 2
        let with_hash_moves = search.search_to_depth(&board, 3).unwrap();

        let mut cold = TranspositionTable::new(1);
        let without = Search::new(&mut cold, None, 1024, false)
            .search_to_depth(&board, 3)
            .unwrap();

        assert_eq!(with_hash_moves.score, without.score);
    }
}
