use std::fmt;

use board_game_traits::Color;

/// The contents of a single square on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Piece {
    #[default]
    Empty,
    White,
    Black,
    King,
}

impl Piece {
    /// The side this piece fights for. The king is counted as a white piece,
    /// an empty square has no side and maps to itself.
    pub const fn side(self) -> Piece {
        match self {
            Piece::King => Piece::White,
            piece => piece,
        }
    }

    /// The opposing side, or `None` for an empty square.
    pub const fn opponent(self) -> Option<Piece> {
        match self {
            Piece::White | Piece::King => Some(Piece::Black),
            Piece::Black => Some(Piece::White),
            Piece::Empty => None,
        }
    }

    pub const fn color(self) -> Option<Color> {
        match self {
            Piece::White | Piece::King => Some(Color::White),
            Piece::Black => Some(Color::Black),
            Piece::Empty => None,
        }
    }

    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::White => Piece::White,
            Color::Black => Piece::Black,
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Piece::Empty)
    }

    /// Index into per-piece tables, such as the zobrist keys
    pub(crate) const fn disc(self) -> usize {
        self as u8 as usize
    }

    pub const fn symbol(self) -> char {
        match self {
            Piece::Empty => '-',
            Piece::White => 'W',
            Piece::Black => 'B',
            Piece::King => 'K',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '-' => Some(Piece::Empty),
            'W' => Some(Piece::White),
            'B' => Some(Piece::Black),
            'K' => Some(Piece::King),
            _ => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
