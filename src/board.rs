use core::fmt;
use std::ops::Index;

use log::debug;

use crate::{
    square::{self, A1, A8, E1, E8, H1, H8},
    zobrist::ZOBRIST_HASHER,
    ChessError, Color, Move, MoveFlags, Piece, PieceType, Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecePositions {
    pub color: Color,
    pub king: u8,
    pub castle_king: bool,
    pub castle_queen: bool,
}

impl PiecePositions {
    fn new(color: Color, king: u8, castle_king: bool, castle_queen: bool) -> Self {
        PiecePositions {
            color,
            king,
            castle_king,
            castle_queen,
        }
    }
}

/// A chess position together with its zobrist hash.
///
/// The hash is maintained incrementally by [Board::play_move] and always
/// equals [Board::calculate_zobrist_hash].
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) fields: [Option<Piece>; 64],

    pub(crate) white_pieces: PiecePositions,
    pub(crate) black_pieces: PiecePositions,

    pub(crate) next_move: Color,

    pub(crate) en_passant_square: Option<u8>,

    pub(crate) half_moves_since_capture: u32,
    pub(crate) full_move_count: u32,

    pub(crate) zobrist_hash: u64,
}

impl PartialEq<Board> for Board {
    fn eq(&self, other: &Board) -> bool {
        // those should be all fields, except for the zobrist hash
        self.fields == other.fields
            && self.white_pieces == other.white_pieces
            && self.black_pieces == other.black_pieces
            && self.next_move == other.next_move
            && self.en_passant_square == other.en_passant_square
            && self.half_moves_since_capture == other.half_moves_since_capture
            && self.full_move_count == other.full_move_count
    }
}
impl Eq for Board {}

impl Default for Board {
    fn default() -> Self {
        Board::start_position()
    }
}

impl Board {
    fn from_parts(
        fields: [Option<Piece>; 64],
        white_pieces: PiecePositions,
        black_pieces: PiecePositions,
        next_move: Color,
        en_passant_square: Option<u8>,
        half_moves_since_capture: u32,
        full_move_count: u32,
    ) -> Self {
        let mut board = Board {
            fields,
            white_pieces,
            black_pieces,
            next_move,
            en_passant_square,
            half_moves_since_capture,
            full_move_count,
            zobrist_hash: 0,
        };
        board.zobrist_hash = board.calculate_zobrist_hash();
        board
    }

    /// The canonical start arrangement.
    pub fn start_position() -> Self {
        use PieceType::*;
        const BACK_RANK: [PieceType; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut fields = [None; 64];
        for (file, &typ) in BACK_RANK.iter().enumerate() {
            fields[file] = Some(Piece::new(typ, Color::Black));
            fields[8 + file] = Some(Piece::new(Pawn, Color::Black));
            fields[48 + file] = Some(Piece::new(Pawn, Color::White));
            fields[56 + file] = Some(Piece::new(typ, Color::White));
        }

        Board::from_parts(
            fields,
            PiecePositions::new(Color::White, E1, true, true),
            PiecePositions::new(Color::Black, E8, true, true),
            Color::White,
            None,
            0,
            1,
        )
    }

    /// Parses a position in Forsyth-Edwards notation. The two clock fields
    /// may be left out, they default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let malformed = |reason: String| ChessError::MalformedInput(format!("{reason} in \"{fen}\""));

        let mut parts = fen.split_whitespace();

        let placement = parts
            .next()
            .ok_or_else(|| malformed("Expected piece placement".to_string()))?;
        let fields = parse_placement(placement).map_err(malformed)?;

        let next_move = match parts.next() {
            Some("w") => Color::White,
            Some("b") => Color::Black,
            _ => return Err(malformed("Expected either 'w' or 'b' to move".to_string())),
        };

        let mut white_castle_king = false;
        let mut white_castle_queen = false;
        let mut black_castle_king = false;
        let mut black_castle_queen = false;
        match parts.next() {
            Some("-") => {}
            Some(castling) => {
                for c in castling.chars() {
                    let right = match c {
                        'K' => &mut white_castle_king,
                        'Q' => &mut white_castle_queen,
                        'k' => &mut black_castle_king,
                        'q' => &mut black_castle_queen,
                        c => {
                            return Err(malformed(format!(
                                "Expected castling availability but got '{c}'"
                            )))
                        }
                    };
                    if *right {
                        return Err(malformed(format!("Duplicate castling right '{c}'")));
                    }
                    *right = true;
                }
            }
            None => return Err(malformed("Expected castling availability".to_string())),
        }

        let en_passant_square = match parts.next() {
            Some("-") => None,
            Some(name) => {
                let en_passant = square::parse_square(name)
                    .ok_or_else(|| malformed(format!("Invalid en-passant square '{name}'")))?;
                let expected_rank = match next_move {
                    Color::White => 6,
                    Color::Black => 3,
                };
                if square::rank(en_passant) != expected_rank {
                    return Err(malformed(format!(
                        "En-passant square '{name}' does not fit {next_move} to move"
                    )));
                }
                Some(en_passant)
            }
            None => return Err(malformed("Expected en-passant".to_string())),
        };

        let half_moves_since_capture: u32 = match parts.next() {
            Some(half_moves) => half_moves
                .parse()
                .map_err(|_| malformed("Could not parse half-move-count".to_string()))?,
            None => 0,
        };

        let full_move_count: u32 = match parts.next() {
            Some(full_moves) => full_moves
                .parse()
                .map_err(|_| malformed("Could not parse move-count".to_string()))?,
            None => 1,
        };

        if parts.next().is_some() {
            return Err(malformed("Expected end of FEN".to_string()));
        }

        let king_square = |color| {
            let king = Piece::new(PieceType::King, color);
            let mut squares = (0..64u8).filter(|&i| fields[i as usize] == Some(king));
            match (squares.next(), squares.next()) {
                (Some(square), None) => Ok(square),
                _ => Err(malformed(format!("Expected exactly one {color} king"))),
            }
        };
        let white_king = king_square(Color::White)?;
        let black_king = king_square(Color::Black)?;

        let mut white_pieces = PiecePositions::new(
            Color::White,
            white_king,
            white_castle_king,
            white_castle_queen,
        );
        let mut black_pieces = PiecePositions::new(
            Color::Black,
            black_king,
            black_castle_king,
            black_castle_queen,
        );
        drop_impossible_castling(&fields, &mut white_pieces);
        drop_impossible_castling(&fields, &mut black_pieces);

        let board = Board::from_parts(
            fields,
            white_pieces,
            black_pieces,
            next_move,
            en_passant_square,
            half_moves_since_capture,
            full_move_count,
        );
        // the king of the side that just moved can never be left in check
        if board.is_in_check(!next_move) {
            return Err(malformed(format!(
                "{} is in check but {next_move} is to move",
                !next_move
            )));
        }
        Ok(board)
    }

    pub fn calculate_zobrist_hash(&self) -> u64 {
        ZOBRIST_HASHER.hash(
            &self.fields,
            &self.black_pieces,
            &self.white_pieces,
            self.en_passant_square,
            self.next_move,
        )
    }

    pub fn generate_fen(&self) -> String {
        let mut fen = String::new();

        for row in 0..8 {
            let mut empty_count = 0;
            for col in 0..8 {
                match self.fields[row * 8 + col] {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char())
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row != 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        match self.next_move {
            Color::White => fen.push('w'),
            Color::Black => fen.push('b'),
        }
        fen.push(' ');

        let castling_start = fen.len();
        if self.white_pieces.castle_king {
            fen.push('K');
        }
        if self.white_pieces.castle_queen {
            fen.push('Q');
        }
        if self.black_pieces.castle_king {
            fen.push('k');
        }
        if self.black_pieces.castle_queen {
            fen.push('q');
        }
        if fen.len() == castling_start {
            fen.push('-');
        }
        fen.push(' ');

        match self.en_passant_square {
            Some(en_passant_square) => fen.push_str(&square::square_name(en_passant_square)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.half_moves_since_capture, self.full_move_count
        ));

        fen
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.zobrist_hash
    }

    #[inline]
    pub fn next_move(&self) -> Color {
        self.next_move
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<u8> {
        self.en_passant_square
    }

    #[inline]
    pub fn half_moves_since_capture(&self) -> u32 {
        self.half_moves_since_capture
    }

    #[inline]
    pub fn full_move_count(&self) -> u32 {
        self.full_move_count
    }

    #[inline]
    pub fn piece_positions(&self, color: Color) -> &PiecePositions {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    #[inline]
    fn piece_positions_mut(&mut self, color: Color) -> &mut PiecePositions {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    /// all occupied squares in board order
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, piece)| piece.map(|piece| (i as u8, piece)))
    }

    /// number of pieces of `color` that are not the king
    pub fn non_king_count(&self, color: Color) -> usize {
        self.pieces()
            .filter(|(_, p)| p.color() == color && p.typ() != PieceType::King)
            .count()
    }

    /// Endgame heuristic: the side with fewer non-king pieces has at most
    /// `threshold` of them left.
    pub fn is_endgame(&self, threshold: usize) -> bool {
        let weaker = self
            .non_king_count(Color::White)
            .min(self.non_king_count(Color::Black));
        weaker <= threshold
    }

    /// Clears a castling right and returns the hash code to fold in, `0` if
    /// the right was already gone.
    fn revoke_castling(&mut self, color: Color, king_side: bool) -> u64 {
        let codes = ZOBRIST_HASHER.king_move(color);
        let positions = self.piece_positions_mut(color);
        let (right, code) = if king_side {
            (&mut positions.castle_king, codes.castle_king)
        } else {
            (&mut positions.castle_queen, codes.castle_queen)
        };
        if std::mem::replace(right, false) {
            code
        } else {
            0
        }
    }

    /// Castling rights lost when a rook leaves or is captured on `square`.
    fn revoke_rook_castling(&mut self, color: Color, square: u8) -> u64 {
        match (color, square) {
            (Color::White, H1) | (Color::Black, H8) => self.revoke_castling(color, true),
            (Color::White, A1) | (Color::Black, A8) => self.revoke_castling(color, false),
            _ => 0,
        }
    }

    /// Plays a move and returns the new zobrist hash.
    ///
    /// This assumes that the move is legal in this position. The hash is
    /// updated incrementally by folding out the codes of everything that
    /// leaves a square or a state and folding in everything that arrives.
    pub fn play_move(&mut self, mve: Move) -> u64 {
        let hasher = &*ZOBRIST_HASHER;

        let Some(piece) = self.fields[mve.from as usize] else {
            debug_assert!(false, "no piece to move for {mve:?}");
            return self.zobrist_hash;
        };
        let color = piece.color();
        debug_assert_eq!(color, self.next_move);

        let mut hash = self.zobrist_hash;

        // the en-passant target only lives for a single move
        if let Some(old_en_passant) = self.en_passant_square.take() {
            hash ^= hasher.en_passant_hash(old_en_passant);
        }

        let captured_square = if mve.flags.contains(MoveFlags::EN_PASSANT) {
            square::row(mve.from) * 8 + square::file(mve.to)
        } else {
            mve.to
        };
        let captured = self.fields[captured_square as usize].take();
        if let Some(captured) = captured {
            debug_assert_ne!(captured.color(), color);
            hash ^= hasher.piece_hash(captured_square, captured);
            if captured.typ() == PieceType::Rook {
                hash ^= self.revoke_rook_castling(captured.color(), captured_square);
            }
        }

        // piece might be different from the moving piece, because of promotion
        let placed = match mve.promote_to {
            Some(typ) => Piece::new(typ, color),
            None => piece,
        };
        self.fields[mve.from as usize] = None;
        self.fields[mve.to as usize] = Some(placed);
        hash ^= hasher.piece_hash(mve.from, piece);
        hash ^= hasher.piece_hash(mve.to, placed);

        if mve.flags.contains(MoveFlags::CASTLE) {
            let (rook_from, rook_to) = if mve.to > mve.from {
                (mve.to + 1, mve.to - 1)
            } else {
                (mve.to - 2, mve.to + 1)
            };
            if let Some(rook) = self.fields[rook_from as usize].take() {
                debug_assert_eq!(rook.typ(), PieceType::Rook);
                self.fields[rook_to as usize] = Some(rook);
                hash ^= hasher.piece_hash(rook_from, rook);
                hash ^= hasher.piece_hash(rook_to, rook);
            }
        }

        match piece.typ() {
            PieceType::King => {
                self.piece_positions_mut(color).king = mve.to;
                hash ^= self.revoke_castling(color, true);
                hash ^= self.revoke_castling(color, false);
            }
            PieceType::Rook => hash ^= self.revoke_rook_castling(color, mve.from),
            _ => {}
        }

        if mve.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH) {
            let en_passant = mve.to.min(mve.from) + 8;
            self.en_passant_square = Some(en_passant);
            hash ^= hasher.en_passant_hash(en_passant);
        }

        if piece.typ() == PieceType::Pawn || captured.is_some() {
            self.half_moves_since_capture = 0;
        } else {
            self.half_moves_since_capture += 1;
        }

        // toggle color for next move
        self.next_move = !color;
        hash ^= hasher.black_move;
        if self.next_move == Color::White {
            self.full_move_count += 1;
        }

        self.zobrist_hash = hash;
        hash
    }
}

fn parse_placement(placement: &str) -> std::result::Result<[Option<Piece>; 64], String> {
    let mut fields = [None; 64];

    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(format!("Expected 8 ranks but got {}", rows.len()));
    }

    for (row, rank) in rows.iter().enumerate() {
        let mut col = 0usize;
        for char in rank.chars() {
            match char {
                '1'..='8' => col += char as usize - '0' as usize,
                _ => {
                    let piece = Piece::from_fen_char(char)
                        .ok_or_else(|| format!("unexpected '{char}' instead of piece"))?;
                    if col >= 8 {
                        return Err(format!("Rank {} has more than 8 squares", 8 - row));
                    }
                    if piece.typ() == PieceType::Pawn && (row == 0 || row == 7) {
                        return Err(format!("Pawn on rank {}", 8 - row));
                    }
                    fields[row * 8 + col] = Some(piece);
                    col += 1;
                }
            }
            if col > 8 {
                return Err(format!("Rank {} has more than 8 squares", 8 - row));
            }
        }
        if col != 8 {
            return Err(format!("Rank {} has only {col} squares", 8 - row));
        }
    }

    Ok(fields)
}

/// FEN strings in the wild claim castling rights with the king or rook gone.
/// Those rights can never be used, drop them so they do not end up in the hash.
fn drop_impossible_castling(fields: &[Option<Piece>; 64], positions: &mut PiecePositions) {
    let color = positions.color;
    let (king_home, king_rook, queen_rook) = match color {
        Color::White => (E1, H1, A1),
        Color::Black => (E8, H8, A8),
    };
    let rook = Some(Piece::new(PieceType::Rook, color));
    let king_home = positions.king == king_home;

    if positions.castle_king && !(king_home && fields[king_rook as usize] == rook) {
        debug!("dropping {color} king side castling right");
        positions.castle_king = false;
    }
    if positions.castle_queen && !(king_home && fields[queen_rook as usize] == rook) {
        debug!("dropping {color} queen side castling right");
        positions.castle_queen = false;
    }
}

impl Index<usize> for Board {
    type Output = Option<Piece>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.fields[index]
    }
}

impl Index<u8> for Board {
    type Output = Option<Piece>;

    fn index(&self, index: u8) -> &Self::Output {
        &self[index as usize]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                let c = self.fields[row * 8 + col].map_or('.', |p| p.fen_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", self.next_move)
    }
}
