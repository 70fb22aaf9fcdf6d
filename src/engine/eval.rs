//! Static evaluation in centipawns.
//!
//! Tables are written from White's point of view with the 8th rank first,
//! the same layout as the board array. Black pieces look up the vertically
//! mirrored square.

use crate::{square, Board, Color, PieceType};

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

const DOUBLED_PAWN_PENALTY: i32 = -20;
const ISOLATED_PAWN_PENALTY: i32 = -10;

/// share of the piece-square bonus knights, bishops, rooks and queens keep in
/// the endgame
pub const ENDGAME_ACTIVITY_PERCENT: i32 = 50;
/// bonus per rank a pawn has advanced, endgame only
pub const ENDGAME_PAWN_ADVANCE_BONUS: i32 = 10;

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MIDDLEGAME_TABLE: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

#[inline]
pub fn piece_value(typ: PieceType) -> i32 {
    match typ {
        PieceType::Pawn => PAWN_VALUE,
        PieceType::Knight => KNIGHT_VALUE,
        PieceType::Bishop => BISHOP_VALUE,
        PieceType::Rook => ROOK_VALUE,
        PieceType::Queen => QUEEN_VALUE,
        // NOTE: a king can't be captured, so it has no material value
        PieceType::King => 0,
    }
}

/// Scores the position from White's point of view. Positive values favor
/// White.
pub fn evaluate(board: &Board, endgame: bool) -> i32 {
    let mut score = 0;
    let mut white_pawn_files = [0i32; 8];
    let mut black_pawn_files = [0i32; 8];

    for (square, piece) in board.pieces() {
        let color = piece.color();
        let table_square = match color {
            Color::White => square,
            Color::Black => square::flip(square),
        } as usize;

        let positional = match piece.typ() {
            PieceType::Pawn => {
                let pawn_files = match color {
                    Color::White => &mut white_pawn_files,
                    Color::Black => &mut black_pawn_files,
                };
                pawn_files[square::file(square) as usize] += 1;

                let mut value = PAWN_TABLE[table_square];
                if endgame {
                    // the table is mirrored for black, so rank 2 is always the start
                    let advanced = square::rank(table_square as u8) as i32 - 2;
                    value += advanced * ENDGAME_PAWN_ADVANCE_BONUS;
                }
                value
            }
            PieceType::King if endgame => KING_ENDGAME_TABLE[table_square],
            PieceType::King => KING_MIDDLEGAME_TABLE[table_square],
            typ => {
                let table = match typ {
                    PieceType::Knight => &KNIGHT_TABLE,
                    PieceType::Bishop => &BISHOP_TABLE,
                    PieceType::Rook => &ROOK_TABLE,
                    _ => &QUEEN_TABLE,
                };
                if endgame {
                    table[table_square] * ENDGAME_ACTIVITY_PERCENT / 100
                } else {
                    table[table_square]
                }
            }
        };

        let value = piece_value(piece.typ()) + positional;
        match color {
            Color::White => score += value,
            Color::Black => score -= value,
        }
    }

    score + pawn_structure(&white_pawn_files) - pawn_structure(&black_pawn_files)
}

/// Same as [evaluate] but from the point of view of the side to move.
#[inline]
pub fn evaluate_relative(board: &Board, endgame: bool) -> i32 {
    match board.next_move() {
        Color::White => evaluate(board, endgame),
        Color::Black => -evaluate(board, endgame),
    }
}

/// doubled and isolated pawn penalties for one side, given its pawn count per file
fn pawn_structure(pawn_files: &[i32; 8]) -> i32 {
    let mut score = 0;
    for (file, &count) in pawn_files.iter().enumerate() {
        if count == 0 {
            continue;
        }
        if count > 1 {
            score += DOUBLED_PAWN_PENALTY * (count - 1);
        }
        let left = file.checked_sub(1).map_or(0, |f| pawn_files[f]);
        let right = pawn_files.get(file + 1).copied().unwrap_or(0);
        if left == 0 && right == 0 {
            score += ISOLATED_PAWN_PENALTY;
        }
    }
    score
}
