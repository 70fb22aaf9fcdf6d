use log::{debug, warn};

use super::{
    deepening::{iterative_deepening, SearchReport},
    transposition::TranspositionTable,
    Engine, EngineOptions, SearchLimits,
};
use crate::{Board, ChessError, Move, Result};

/// A single game: owns the position, its hash and the search memory.
///
/// Sessions are independent of each other. Any number of them can exist at
/// the same time, each on its own thread if needed.
#[derive(Debug, Clone)]
pub struct EllaChess {
    board: Board,
    options: EngineOptions,
    transpositions: TranspositionTable,
}

impl Engine for EllaChess {
    fn new_from_board(board: Board) -> Self {
        EllaChess::with_options(board, EngineOptions::default())
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn accept_move(&mut self, mve: Move) -> Result<u64> {
        if !self.board.is_legal(mve) {
            warn!("rejecting illegal move {mve} in {}", self.board.generate_fen());
            return Err(ChessError::IllegalMove(format!(
                "{mve} in \"{}\"",
                self.board.generate_fen()
            )));
        }
        let hash = self.board.play_move(mve);
        debug!("played {mve}, hash is now {hash:#018x}");
        Ok(hash)
    }

    fn find_best_move(&mut self, limits: &SearchLimits) -> Result<SearchReport> {
        let endgame = self.board.is_endgame(self.options.endgame_threshold);
        iterative_deepening(
            &self.board,
            limits,
            endgame,
            &self.options,
            &mut self.transpositions,
        )
    }
}

impl EllaChess {
    pub fn with_options(board: Board, options: EngineOptions) -> Self {
        EllaChess {
            board,
            options,
            transpositions: TranspositionTable::new(options.hash_size_mb),
        }
    }

    /// Starts a session from `fen`, or from the start position if there is
    /// none. A malformed `fen` still yields a session in the start position,
    /// together with the reason it was rejected.
    pub fn new_session(fen: Option<&str>) -> (Self, Option<ChessError>) {
        Self::new_session_with_options(fen, EngineOptions::default())
    }

    pub fn new_session_with_options(
        fen: Option<&str>,
        options: EngineOptions,
    ) -> (Self, Option<ChessError>) {
        let (board, error) = match fen.map(Board::from_fen) {
            None => (Board::start_position(), None),
            Some(Ok(board)) => (board, None),
            Some(Err(e)) => {
                warn!("{e}, starting from the start position");
                (Board::start_position(), Some(e))
            }
        };
        (Self::with_options(board, options), error)
    }

    /// Plays a move given in UCI notation, e.g. `e2e4` or `e7e8q`.
    pub fn play_uci(&mut self, uci: &str) -> Result<u64> {
        let mve = self.board.parse_uci_move(uci).map_err(|e| {
            warn!("rejecting move '{uci}': {e}");
            e
        })?;
        self.accept_move(mve)
    }

    /// Searches for the best move and plays it.
    pub fn play_best_move(&mut self, limits: &SearchLimits) -> Result<SearchReport> {
        let report = self.find_best_move(limits)?;
        self.board.play_move(report.best_move);
        Ok(report)
    }

    pub fn hash(&self) -> u64 {
        self.board.zobrist_hash()
    }

    pub fn fen(&self) -> String {
        self.board.generate_fen()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{engine::SearchState, GameOutcome, START_BOARD_FEN};
    use std::time::Duration;

    #[test]
    fn malformed_fen_falls_back_to_start() {
        let (session, error) = EllaChess::new_session(Some("definitely not a fen"));
        assert!(matches!(error, Some(ChessError::MalformedInput(_))));
        assert_eq!(session.fen(), START_BOARD_FEN);
        assert_eq!(session.hash(), Board::start_position().zobrist_hash());

        let (session, error) = EllaChess::new_session(None);
        assert_eq!(error, None);
        assert_eq!(session.board(), &Board::start_position());
    }

    #[test]
    fn accepted_moves_update_the_hash() {
        let (mut session, _) = EllaChess::new_session(None);
        let hash = session.play_uci("e2e4").unwrap();
        assert_eq!(hash, session.hash());
        assert_eq!(hash, session.board().calculate_zobrist_hash());

        let expected =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(session.board(), &expected);
        assert_eq!(hash, expected.zobrist_hash());
    }

    #[test]
    fn illegal_moves_leave_the_session_unchanged() {
        let (mut session, _) = EllaChess::new_session(None);
        let before = session.board().clone();

        assert!(matches!(session.play_uci("e2e5"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(session.play_uci("e9e4"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(
            session.accept_move(Move::new(0, 63)),
            Err(ChessError::IllegalMove(_))
        ));

        assert_eq!(session.board(), &before);
        assert_eq!(session.hash(), before.zobrist_hash());
    }

    #[test]
    fn start_position_depth_two() {
        let (mut session, _) = EllaChess::new_session(None);
        let report = session
            .find_best_move(&SearchLimits::new(2, Duration::from_secs(600)))
            .unwrap();

        assert!(session.board().is_legal(report.best_move));
        assert!(report.score.abs() < 100, "{}", report.score);
        assert!(report.nodes > 20 + 20, "{}", report.nodes);
        assert_eq!(report.depth, 2);
        assert_eq!(report.state, SearchState::Completed);
        assert!(!report.endgame);
    }

    #[test]
    fn search_is_deterministic() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let limits = SearchLimits::depth_only(3);

        let (mut a, _) = EllaChess::new_session(Some(fen));
        let (mut b, _) = EllaChess::new_session(Some(fen));
        let first = a.find_best_move(&limits).unwrap();
        let second = b.find_best_move(&limits).unwrap();
        // the same session again, with a warm transposition table
        let third = a.find_best_move(&limits).unwrap();

        for report in [&second, &third] {
            assert_eq!(report.best_move, first.best_move);
            assert_eq!(report.score, first.score);
            assert_eq!(report.nodes, first.nodes);
        }
    }

    #[test]
    fn mate_in_one() {
        let (mut session, _) = EllaChess::new_session(Some(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        ));
        let report = session.play_best_move(&SearchLimits::default()).unwrap();
        assert_eq!(report.best_move.to_uci(), "f3f7");
        assert!(report.is_mate());

        assert_eq!(
            session.find_best_move(&SearchLimits::default()),
            Err(ChessError::NoMoveFound(GameOutcome::Checkmate {
                winner: crate::Color::White
            }))
        );
    }

    #[test]
    fn zero_time_budget_is_repeatable() {
        let (mut session, _) = EllaChess::new_session(None);
        let limits = SearchLimits::new(4, Duration::ZERO);
        let first = session.find_best_move(&limits).unwrap();
        let second = session.find_best_move(&limits).unwrap();
        assert_eq!(first.best_move, second.best_move);
        assert!(session.board().is_legal(first.best_move));
    }

    #[test]
    fn huge_time_budget_searches_without_deadline() {
        let (mut session, _) = EllaChess::new_session(None);
        let report = session
            .find_best_move(&SearchLimits::new(1, Duration::MAX))
            .unwrap();
        assert_eq!(report.state, SearchState::Completed);
        assert_eq!(report.depth, 1);
        assert!(session.board().is_legal(report.best_move));
    }

    #[test]
    fn endgame_flag_follows_the_threshold() {
        let fen = "4k3/pppp4/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1";
        let limits = SearchLimits::depth_only(1);

        let (mut session, _) = EllaChess::new_session(Some(fen));
        assert!(session.find_best_move(&limits).unwrap().endgame);

        let options = EngineOptions {
            endgame_threshold: 3,
            ..EngineOptions::default()
        };
        let (mut session, _) = EllaChess::new_session_with_options(Some(fen), options);
        assert!(!session.find_best_move(&limits).unwrap().endgame);
    }
}
