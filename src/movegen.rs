//! Legal move generation and the position queries built on top of it.

use crate::{
    square::{self, A1, A8, E1, E8, H1, H8},
    Board, ChessError, Color, GameOutcome, Move, Piece, PieceType, Result,
};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[inline]
fn coords(square: u8) -> (i8, i8) {
    (square::file(square) as i8, square::row(square) as i8)
}

impl Board {
    /// All legal moves for the side to move, in generation order.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = self.pseudo_legal_moves();
        moves.retain(|&mve| self.keeps_king_safe(mve));
        moves
    }

    /// Same as `!self.legal_moves().is_empty()` but stops at the first legal move.
    pub fn has_legal_moves(&self) -> bool {
        self.pseudo_legal_moves()
            .into_iter()
            .any(|mve| self.keeps_king_safe(mve))
    }

    pub fn is_legal(&self, mve: Move) -> bool {
        self.legal_moves().contains(&mve)
    }

    /// Looks up the legal move matching the given squares and promotion.
    pub fn find_move(&self, from: u8, to: u8, promote_to: Option<PieceType>) -> Option<Move> {
        self.legal_moves()
            .into_iter()
            .find(|m| m.from == from && m.to == to && m.promote_to == promote_to)
    }

    /// Resolves a move given in UCI notation against the legal moves of this
    /// position.
    pub fn parse_uci_move(&self, uci: &str) -> Result<Move> {
        let not_uci = || ChessError::IllegalMove(format!("'{uci}' is not a move in UCI notation"));

        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            return Err(not_uci());
        }
        let from = square::parse_square(&uci[0..2]).ok_or_else(not_uci)?;
        let to = square::parse_square(&uci[2..4]).ok_or_else(not_uci)?;
        let promote_to = match uci[4..].chars().next() {
            Some(c) => Some(PieceType::from_promotion_char(c).ok_or_else(not_uci)?),
            None => None,
        };

        self.find_move(from, to, promote_to)
            .ok_or_else(|| ChessError::IllegalMove(format!("{uci} in \"{}\"", self.generate_fen())))
    }

    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        let king = self.piece_positions(color).king;
        self.is_square_attacked(king, !color)
    }

    /// Whether playing `mve` leaves the opponent in check.
    pub fn gives_check(&self, mve: Move) -> bool {
        let mut board = self.clone();
        board.play_move(mve);
        board.is_in_check(board.next_move)
    }

    /// `None` while the side to move has a legal move.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.has_legal_moves() {
            None
        } else if self.is_in_check(self.next_move) {
            Some(GameOutcome::Checkmate {
                winner: !self.next_move,
            })
        } else {
            Some(GameOutcome::Stalemate)
        }
    }

    /// Counts the leaf nodes of the legal move tree `depth` plies deep.
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .into_iter()
            .map(|mve| {
                let mut board = self.clone();
                board.play_move(mve);
                board.perft(depth - 1)
            })
            .sum()
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        let (x, y) = coords(target);
        let attacker = |typ| Some(Piece::new(typ, by));
        let occupant = |x: i8, y: i8| square::from_coords(x, y).map(|sq| self.fields[sq as usize]);

        // a pawn attacks diagonally forward, so look one row back from its view
        let pawn_row = match by {
            Color::White => y + 1,
            Color::Black => y - 1,
        };
        for dx in [-1, 1] {
            if occupant(x + dx, pawn_row) == Some(attacker(PieceType::Pawn)) {
                return true;
            }
        }

        for (dx, dy) in KNIGHT_OFFSETS {
            if occupant(x + dx, y + dy) == Some(attacker(PieceType::Knight)) {
                return true;
            }
        }

        for (dx, dy) in KING_OFFSETS {
            if occupant(x + dx, y + dy) == Some(attacker(PieceType::King)) {
                return true;
            }
        }

        let slides_into = |directions: [(i8, i8); 4], typ: PieceType| {
            directions.iter().any(|&(dx, dy)| {
                let (mut cx, mut cy) = (x + dx, y + dy);
                while let Some(field) = occupant(cx, cy) {
                    if let Some(piece) = field {
                        return piece.color() == by
                            && (piece.typ() == typ || piece.typ() == PieceType::Queen);
                    }
                    cx += dx;
                    cy += dy;
                }
                false
            })
        };

        slides_into(ROOK_DIRECTIONS, PieceType::Rook)
            || slides_into(BISHOP_DIRECTIONS, PieceType::Bishop)
    }

    fn keeps_king_safe(&self, mve: Move) -> bool {
        let mut board = self.clone();
        board.play_move(mve);
        !board.is_in_check(self.next_move)
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let color = self.next_move;
        let mut moves = Vec::with_capacity(48);

        for (from, piece) in self.pieces().filter(|(_, p)| p.color() == color) {
            match piece.typ() {
                PieceType::Pawn => self.generate_pawn_moves(from, color, &mut moves),
                PieceType::Knight => self.generate_step_moves(from, color, &KNIGHT_OFFSETS, &mut moves),
                PieceType::King => {
                    self.generate_step_moves(from, color, &KING_OFFSETS, &mut moves);
                    self.generate_castling_moves(color, &mut moves);
                }
                PieceType::Bishop => {
                    self.generate_sliding_moves(from, color, &BISHOP_DIRECTIONS, &mut moves)
                }
                PieceType::Rook => {
                    self.generate_sliding_moves(from, color, &ROOK_DIRECTIONS, &mut moves)
                }
                PieceType::Queen => {
                    self.generate_sliding_moves(from, color, &BISHOP_DIRECTIONS, &mut moves);
                    self.generate_sliding_moves(from, color, &ROOK_DIRECTIONS, &mut moves);
                }
            }
        }

        moves
    }

    fn generate_pawn_moves(&self, from: u8, color: Color, moves: &mut Vec<Move>) {
        let (x, y) = coords(from);
        let (direction, start_row, promotion_row) = match color {
            Color::White => (-1, 6, 0),
            Color::Black => (1, 1, 7),
        };

        let push = |moves: &mut Vec<Move>, to: u8, capture: bool| {
            if square::row(to) == promotion_row {
                for target in PieceType::ALL_PROMTION_TARGETS {
                    moves.push(Move::promotion(from, to, target, capture));
                }
            } else if capture {
                moves.push(Move::capture(from, to));
            } else {
                moves.push(Move::new(from, to));
            }
        };

        if let Some(to) = square::from_coords(x, y + direction) {
            if self.fields[to as usize].is_none() {
                push(moves, to, false);

                if y == start_row {
                    if let Some(double) = square::from_coords(x, y + 2 * direction) {
                        if self.fields[double as usize].is_none() {
                            moves.push(Move::double_push(from, double));
                        }
                    }
                }
            }
        }

        for dx in [-1, 1] {
            let Some(to) = square::from_coords(x + dx, y + direction) else {
                continue;
            };
            if self.en_passant_square == Some(to) {
                moves.push(Move::en_passant(from, to));
            } else if let Some(target) = self.fields[to as usize] {
                if target.color() != color {
                    push(moves, to, true);
                }
            }
        }
    }

    fn generate_step_moves(
        &self,
        from: u8,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        let (x, y) = coords(from);
        for &(dx, dy) in offsets {
            let Some(to) = square::from_coords(x + dx, y + dy) else {
                continue;
            };
            match self.fields[to as usize] {
                None => moves.push(Move::new(from, to)),
                Some(target) if target.color() != color => moves.push(Move::capture(from, to)),
                Some(_) => {}
            }
        }
    }

    fn generate_sliding_moves(
        &self,
        from: u8,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        let (x, y) = coords(from);
        for &(dx, dy) in directions {
            let (mut cx, mut cy) = (x + dx, y + dy);
            while let Some(to) = square::from_coords(cx, cy) {
                match self.fields[to as usize] {
                    None => moves.push(Move::new(from, to)),
                    Some(target) => {
                        if target.color() != color {
                            moves.push(Move::capture(from, to));
                        }
                        break;
                    }
                }
                cx += dx;
                cy += dy;
            }
        }
    }

    /// Castling needs the right, the rook on its corner, empty squares between
    /// king and rook and a king that neither starts in nor passes through check.
    fn generate_castling_moves(&self, color: Color, moves: &mut Vec<Move>) {
        let positions = self.piece_positions(color);
        if !positions.castle_king && !positions.castle_queen {
            return;
        }

        let (king_home, king_rook, queen_rook) = match color {
            Color::White => (E1, H1, A1),
            Color::Black => (E8, H8, A8),
        };
        if positions.king != king_home || self.is_square_attacked(king_home, !color) {
            return;
        }

        let rook = Some(Piece::new(PieceType::Rook, color));
        let empty = |squares: &[u8]| squares.iter().all(|&sq| self.fields[sq as usize].is_none());
        let safe = |squares: &[u8]| squares.iter().all(|&sq| !self.is_square_attacked(sq, !color));

        if positions.castle_king
            && self.fields[king_rook as usize] == rook
            && empty(&[king_home + 1, king_home + 2])
            && safe(&[king_home + 1, king_home + 2])
        {
            moves.push(Move::castle(king_home, king_home + 2));
        }

        if positions.castle_queen
            && self.fields[queen_rook as usize] == rook
            && empty(&[king_home - 1, king_home - 2, king_home - 3])
            && safe(&[king_home - 1, king_home - 2])
        {
            moves.push(Move::castle(king_home, king_home - 2));
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        board::test::*, square::parse_square, Board, ChessError, Color, GameOutcome, MoveFlags,
        PieceType, START_BOARD_FEN,
    };

    pub const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    pub const POSITION_4: &str =
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    pub const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    pub const MOST_POSS_MOVES_FEN: &str =
        "R6R/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNNK1B1 w - - 0 1";
    pub const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    pub const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

    fn move_count(fen: &str) -> usize {
        Board::from_fen(fen).unwrap().legal_moves().len()
    }

    #[test]
    fn correct_move_count_start() {
        assert_eq!(move_count(START_BOARD_FEN), 20);
    }

    #[test]
    fn correct_move_count_most_moves() {
        assert_eq!(move_count(MOST_POSS_MOVES_FEN), 218);
    }

    #[test]
    fn correct_move_count_en_passant() {
        assert_eq!(move_count(EN_PASSANT_POS_W), 30);
    }

    #[test]
    fn correct_move_count_castle() {
        assert_eq!(move_count(CASTLE_QUEEN_W), 23);
        assert_eq!(move_count(CASTLE_KING_W), 22);
    }

    #[test]
    fn perft_start() {
        let board = Board::start_position();
        assert_eq!(board.perft(1), 20);
        assert_eq!(board.perft(2), 400);
        assert_eq!(board.perft(3), 8902);
    }

    #[test]
    fn perft_kiwipete() {
        let board = Board::from_fen(KIWIPETE).unwrap();
        assert_eq!(board.perft(1), 48);
        assert_eq!(board.perft(2), 2039);
    }

    #[test]
    fn perft_tricky_positions() {
        assert_eq!(Board::from_fen(POSITION_3).unwrap().perft(3), 2812);
        assert_eq!(Board::from_fen(POSITION_4).unwrap().perft(2), 264);
        assert_eq!(Board::from_fen(POSITION_5).unwrap().perft(2), 1486);
    }

    #[test]
    fn no_castling_out_of_or_through_check() {
        // the bishop on b4 gives check
        let board = Board::from_fen("4k3/8/8/8/1b6/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(board
            .legal_moves()
            .iter()
            .all(|m| !m.flags.contains(MoveFlags::CASTLE)));

        // the rook on f8 covers f1, queen side stays available
        let board = Board::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<_> = board
            .legal_moves()
            .into_iter()
            .filter(|m| m.flags.contains(MoveFlags::CASTLE))
            .map(|m| m.to_uci())
            .collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);

        // b1 may be attacked, it only needs to be empty
        let board = Board::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(board.find_move(60, 58, None).is_some());
    }

    #[test]
    fn pawn_pushes_do_not_attack() {
        // the black pawn on e3 blocks e2 but does not attack it
        let board = Board::from_fen("4k3/8/8/8/8/4p3/8/3K4 w - - 0 1").unwrap();
        assert!(!board.is_square_attacked(parse_square("e2").unwrap(), Color::Black));
        assert!(board.is_square_attacked(parse_square("d2").unwrap(), Color::Black));
        assert!(board.find_move(59, 52, None).is_some());
    }

    #[test]
    fn promotions_offer_all_targets() {
        let board = Board::from_fen(WHITE_PROMOTION).unwrap();
        let g7 = parse_square("g7").unwrap();
        let targets: Vec<_> = board
            .legal_moves()
            .into_iter()
            .filter(|m| m.from == g7)
            .map(|m| (m.to, m.promote_to))
            .collect();
        // g8 push plus captures on f8 and h8, four targets each
        assert_eq!(targets.len(), 12);
        assert!(targets.iter().all(|(_, p)| p.is_some()));
    }

    #[test]
    fn outcomes() {
        assert_eq!(Board::start_position().outcome(), None);
        assert_eq!(
            Board::from_fen(FOOLS_MATE).unwrap().outcome(),
            Some(GameOutcome::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(
            Board::from_fen(STALEMATE).unwrap().outcome(),
            Some(GameOutcome::Stalemate)
        );
    }

    #[test]
    fn uci_parsing() {
        let board = Board::start_position();
        let mve = board.parse_uci_move("e2e4").unwrap();
        assert!(mve.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH));

        assert!(matches!(
            board.parse_uci_move("e2e5"),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            board.parse_uci_move("hello"),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            board.parse_uci_move("e7e8x"),
            Err(ChessError::IllegalMove(_))
        ));

        let board = Board::from_fen(WHITE_PROMOTION).unwrap();
        let mve = board.parse_uci_move("g7h8n").unwrap();
        assert_eq!(mve.promote_to, Some(PieceType::Knight));
        assert!(mve.is_capture());
    }

    #[test]
    fn gives_check() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(board.gives_check(board.parse_uci_move("a1a8").unwrap()));
        assert!(!board.gives_check(board.parse_uci_move("a1a7").unwrap()));
    }
}
