use core::fmt;
use std::{fmt::Display, num::NonZeroU8, ops::Not};

use bitflags::bitflags;

mod board;
pub mod engine;
mod error;
mod movegen;
pub mod square;
pub mod zobrist;

pub use board::{Board, PiecePositions};
pub use error::{ChessError, GameOutcome, Result};

pub const START_BOARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    King = 0b001,
    Queen = 0b010,
    Bishop = 0b011,
    Knight = 0b100,
    Rook = 0b101,
    Pawn = 0b110,
}

impl PieceType {
    pub const ALL_TYPES: [PieceType; 6] = {
        use PieceType::*;
        [King, Queen, Bishop, Knight, Rook, Pawn]
    };

    pub const ALL_PROMTION_TARGETS: [PieceType; 4] = {
        use PieceType::*;
        [Queen, Rook, Knight, Bishop]
    };

    /// lower case letter used for promotions in UCI notation
    pub fn uci_char(self) -> char {
        match self {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        }
    }

    pub fn from_promotion_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'q' => Some(PieceType::Queen),
            'r' => Some(PieceType::Rook),
            'b' => Some(PieceType::Bishop),
            'n' => Some(PieceType::Knight),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 0b1000,
}

impl Color {
    pub const ALL_COLORS: [Color; 2] = [Color::White, Color::Black];
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece(NonZeroU8);

impl Piece {
    pub fn new(typ: PieceType, color: Color) -> Self {
        // Safety: typ is always > 0
        unsafe { Piece(NonZeroU8::new_unchecked(typ as u8 | color as u8)) }
    }

    #[inline(always)]
    pub fn typ(&self) -> PieceType {
        match self.0.get() & 0b111 {
            0b001 => PieceType::King,
            0b010 => PieceType::Queen,
            0b011 => PieceType::Bishop,
            0b100 => PieceType::Knight,
            0b101 => PieceType::Rook,
            _ => PieceType::Pawn,
        }
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        if self.0.get() & Color::Black as u8 == Color::Black as u8 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn fen_char(&self) -> char {
        let c = self.typ().uci_char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let typ = match c.to_ascii_lowercase() {
            'k' => PieceType::King,
            'q' => PieceType::Queen,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            'r' => PieceType::Rook,
            'p' => PieceType::Pawn,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(typ, color))
    }

    /// index into the piece dimension of the zobrist codebook, in `0..12`
    fn zobrist_index(&self) -> usize {
        let typ = self.typ() as usize - 1;
        match self.color() {
            Color::White => typ * 2,
            Color::Black => typ * 2 + 1,
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("type", &self.typ())
            .field("color", &self.color())
            .finish()
    }
}

bitflags! {
    /// Bookkeeping flags set by move generation. [Board::play_move] uses them
    /// to pick the special cases of the board and hash update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveFlags: u8 {
        const CAPTURE = 0b0001;
        const CASTLE = 0b0010;
        const EN_PASSANT = 0b0100;
        const DOUBLE_PAWN_PUSH = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promote_to: Option<PieceType>,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: u8, to: u8) -> Self {
        Move {
            from,
            to,
            promote_to: None,
            flags: MoveFlags::empty(),
        }
    }

    pub fn capture(from: u8, to: u8) -> Self {
        Move {
            flags: MoveFlags::CAPTURE,
            ..Move::new(from, to)
        }
    }

    pub fn double_push(from: u8, to: u8) -> Self {
        Move {
            flags: MoveFlags::DOUBLE_PAWN_PUSH,
            ..Move::new(from, to)
        }
    }

    pub fn en_passant(from: u8, to: u8) -> Self {
        Move {
            flags: MoveFlags::EN_PASSANT | MoveFlags::CAPTURE,
            ..Move::new(from, to)
        }
    }

    pub fn castle(from: u8, to: u8) -> Self {
        Move {
            flags: MoveFlags::CASTLE,
            ..Move::new(from, to)
        }
    }

    pub fn promotion(from: u8, to: u8, target: PieceType, capture: bool) -> Self {
        Move {
            from,
            to,
            promote_to: Some(target),
            flags: if capture {
                MoveFlags::CAPTURE
            } else {
                MoveFlags::empty()
            },
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    /// long algebraic notation as used by UCI, e.g. `e2e4` or `e7e8q`
    pub fn to_uci(&self) -> String {
        let mut uci = format!(
            "{}{}",
            square::square_name(self.from),
            square::square_name(self.to)
        );
        if let Some(promotion) = self.promote_to {
            uci.push(promotion.uci_char());
        }
        uci
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

#[cfg(test)]
mod test {
    use crate::{Color, Move, MoveFlags, Piece, PieceType};
    use std::collections::HashSet;

    #[test]
    fn pices_are_unique_u8() {
        let mut pieces = HashSet::new();
        for color in Color::ALL_COLORS {
            for typ in PieceType::ALL_TYPES {
                let piece = Piece::new(typ, color);
                assert!(!pieces.contains(&piece));
                pieces.insert(piece);
            }
        }
        assert!(pieces.len() == 12);
    }

    #[test]
    fn piece_type_and_color_survive_packing() {
        for color in Color::ALL_COLORS {
            for typ in PieceType::ALL_TYPES {
                let piece = Piece::new(typ, color);
                assert_eq!(piece.typ(), typ);
                assert_eq!(piece.color(), color);
                assert_eq!(Piece::from_fen_char(piece.fen_char()), Some(piece));
            }
        }
    }

    #[test]
    fn zobrist_indices_cover_all_pieces() {
        let indices: HashSet<usize> = Color::ALL_COLORS
            .iter()
            .flat_map(|&color| {
                PieceType::ALL_TYPES
                    .iter()
                    .map(move |&typ| Piece::new(typ, color).zobrist_index())
            })
            .collect();
        assert_eq!(indices, (0..12).collect());
    }

    #[test]
    fn uci_notation() {
        // e2 = 52, e4 = 36
        assert_eq!(Move::double_push(52, 36).to_uci(), "e2e4");
        // e7 = 12, e8 = 4
        assert_eq!(
            Move::promotion(12, 4, PieceType::Queen, false).to_uci(),
            "e7e8q"
        );
        assert!(Move::en_passant(28, 19).flags.contains(MoveFlags::CAPTURE));
    }
}
