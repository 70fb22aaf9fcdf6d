use super::eval::piece_value;
use crate::{Board, Move, MoveFlags, PieceType};

const HASH_MOVE_SCORE: i32 = 1_000_000;
const PROMOTION_SCORE: i32 = 100_000;
const CAPTURE_SCORE_BASE: i32 = 10_000;
const CHECK_SCORE: i32 = 5_000;

/// Ranks moves so that the ones most likely to cause a cutoff come first.
#[derive(Debug, Clone, Default)]
pub struct MoveOrderer {
    move_scores: Vec<(Move, i32)>,
}

impl MoveOrderer {
    pub fn new() -> Self {
        MoveOrderer {
            move_scores: Vec::new(),
        }
    }

    /// Returns `moves` sorted by descending heuristic score. Moves with equal
    /// scores keep their generation order, so the result is deterministic.
    pub fn order_moves(
        &mut self,
        board: &Board,
        moves: &[Move],
        hash_move: Option<Move>,
    ) -> Vec<Move> {
        self.move_scores.clear();
        self.move_scores.extend(
            moves
                .iter()
                .map(|&mve| (mve, Self::score_move(board, mve, hash_move))),
        );

        // sort_by is stable
        self.move_scores.sort_by(|a, b| b.1.cmp(&a.1));

        self.move_scores.iter().map(|(mve, _)| *mve).collect()
    }

    pub fn score_move(board: &Board, mve: Move, hash_move: Option<Move>) -> i32 {
        if hash_move == Some(mve) {
            return HASH_MOVE_SCORE;
        }

        let mut score = 0;

        if let Some(promotion) = mve.promote_to {
            score += PROMOTION_SCORE + piece_value(promotion);
        }

        if mve.is_capture() {
            // Most Valuable Victim - Least Valuable Attacker
            let victim = if mve.flags.contains(MoveFlags::EN_PASSANT) {
                Some(PieceType::Pawn)
            } else {
                board[mve.to].map(|p| p.typ())
            };
            let attacker = board[mve.from].map(|p| p.typ());
            if let (Some(victim), Some(attacker)) = (victim, attacker) {
                score += CAPTURE_SCORE_BASE + 10 * piece_value(victim) - piece_value(attacker);
            }
        }

        if board.gives_check(mve) {
            score += CHECK_SCORE;
        }

        score
    }
}
