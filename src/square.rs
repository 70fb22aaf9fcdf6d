//! Square indexing helpers.
//!
//! Squares are `u8` indices into the board array. Index 0 is a8 and index 63
//! is h1, i.e. the board is stored rank 8 first, the same order a FEN string
//! lists the ranks in.

pub const A8: u8 = 0;
pub const E8: u8 = 4;
pub const H8: u8 = 7;
pub const A1: u8 = 56;
pub const E1: u8 = 60;
pub const H1: u8 = 63;

/// column on the board, `0` is the a-file
#[inline]
pub fn file(square: u8) -> u8 {
    square % 8
}

/// row in the board array, `0` is the 8th rank
#[inline]
pub fn row(square: u8) -> u8 {
    square / 8
}

/// chess rank in `1..=8`
#[inline]
pub fn rank(square: u8) -> u8 {
    8 - row(square)
}

/// square index for a file/row pair, `None` if off the board
#[inline]
pub fn from_coords(file: i8, row: i8) -> Option<u8> {
    if (0..8).contains(&file) && (0..8).contains(&row) {
        Some((row * 8 + file) as u8)
    } else {
        None
    }
}

/// mirrors a square vertically, e.g. a8 <-> a1
#[inline]
pub fn flip(square: u8) -> u8 {
    square ^ 56
}

pub fn square_name(square: u8) -> String {
    let file = (b'a' + file(square)) as char;
    format!("{file}{}", rank(square))
}

/// parses algebraic square names like `e4`
pub fn parse_square(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    let file = file as u8 - b'a';
    let rank = rank as u8 - b'0';
    Some((8 - rank) * 8 + file)
}
