use std::fmt;
use std::str::FromStr;

use super::Direction::{self, *};

/// Number of squares on one side of the board.
pub const BOARD_SIZE: usize = 9;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// The throne, and the four squares surrounding it.
pub const THRONE: Square = Square::from_col_row(4, 4);
pub const NTHRONE: Square = Square::from_col_row(4, 5);
pub const STHRONE: Square = Square::from_col_row(4, 3);
pub const WTHRONE: Square = Square::from_col_row(3, 4);
pub const ETHRONE: Square = Square::from_col_row(5, 4);

pub const SURROUNDING_THRONE: [Square; 4] = [NTHRONE, STHRONE, WTHRONE, ETHRONE];

/// A location on the board. The linear index is `row * 9 + col`, with `a1` at index 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    inner: u8,
}

impl Square {
    pub const fn from_u8(inner: u8) -> Self {
        assert!((inner as usize) < NUM_SQUARES);
        Square { inner }
    }

    pub const fn from_col_row(col: u8, row: u8) -> Self {
        assert!(col < BOARD_SIZE as u8 && row < BOARD_SIZE as u8);
        Square::from_u8(row * BOARD_SIZE as u8 + col)
    }

    pub const fn into_inner(self) -> u8 {
        self.inner
    }

    pub const fn index(self) -> usize {
        self.inner as usize
    }

    pub const fn col(self) -> u8 {
        self.inner % BOARD_SIZE as u8
    }

    pub const fn row(self) -> u8 {
        self.inner / BOARD_SIZE as u8
    }

    pub const fn is_edge(self) -> bool {
        let (col, row) = (self.col(), self.row());
        col == 0 || row == 0 || col == BOARD_SIZE as u8 - 1 || row == BOARD_SIZE as u8 - 1
    }

    /// The square `steps` squares away in `direction`, if it is on the board.
    pub const fn rook_move(self, direction: Direction, steps: u8) -> Option<Self> {
        let col = self.col();
        let row = self.row();
        match direction {
            North => {
                if row + steps < BOARD_SIZE as u8 {
                    Some(Square::from_col_row(col, row + steps))
                } else {
                    None
                }
            }
            East => {
                if col + steps < BOARD_SIZE as u8 {
                    Some(Square::from_col_row(col + steps, row))
                } else {
                    None
                }
            }
            South => {
                if let Some(new_row) = row.checked_sub(steps) {
                    Some(Square::from_col_row(col, new_row))
                } else {
                    None
                }
            }
            West => {
                if let Some(new_col) = col.checked_sub(steps) {
                    Some(Square::from_col_row(new_col, row))
                } else {
                    None
                }
            }
        }
    }

    pub fn neighbour(self, direction: Direction) -> Option<Self> {
        self.rook_move(direction, 1)
    }

    /// The orthogonal neighbours of the square that are on the board.
    pub fn neighbours(self) -> impl Iterator<Item = Square> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbour(direction))
    }

    /// The direction of a rook move from this square to `other`, or `None`
    /// if the two squares do not share a row or column.
    pub const fn direction_to(self, other: Square) -> Option<Direction> {
        if self.inner == other.inner {
            None
        } else if self.col() == other.col() {
            if other.row() > self.row() {
                Some(North)
            } else {
                Some(South)
            }
        } else if self.row() == other.row() {
            if other.col() > self.col() {
                Some(East)
            } else {
                Some(West)
            }
        } else {
            None
        }
    }

    /// Number of rook steps between two squares on the same row or column.
    pub const fn distance(self, other: Square) -> u8 {
        self.col().abs_diff(other.col()) + self.row().abs_diff(other.row())
    }

    /// The square in the middle of this square and `other`, when they are exactly
    /// two rook steps apart.
    pub const fn between(self, other: Square) -> Option<Square> {
        match self.direction_to(other) {
            Some(direction) if self.distance(other) == 2 => self.rook_move(direction, 1),
            _ => None,
        }
    }

    /// All squares reachable from this square in `direction`, nearest first.
    pub fn rook_ray(self, direction: Direction) -> &'static [Square] {
        ROOK_RAYS[self.index()][direction as usize].squares()
    }

    pub fn parse_square(input: &str) -> Result<Square, pgn_traits::Error> {
        let bytes = input.as_bytes();
        if bytes.len() != 2 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\"",
                input
            )));
        }
        let col = bytes[0].wrapping_sub(b'a');
        let row = bytes[1].wrapping_sub(b'1');
        if col >= BOARD_SIZE as u8 || row >= BOARD_SIZE as u8 {
            Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\": coordinates must be a-i and 1-9",
                input
            )))
        } else {
            Ok(Square::from_col_row(col, row))
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (self.col() + b'a') as char)?;
        write!(f, "{}", self.row() + 1)
    }
}

impl FromStr for Square {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Square::parse_square(input)
    }
}

/// Iterates over all board squares, in index order.
pub fn squares_iterator() -> impl Iterator<Item = Square> {
    (0..NUM_SQUARES as u8).map(Square::from_u8)
}

/// The squares a rook could reach from one square in one direction on an empty board.
#[derive(Clone, Copy, Debug)]
pub struct RookRay {
    squares: [Square; BOARD_SIZE - 1],
    len: u8,
}

impl RookRay {
    const fn empty() -> Self {
        RookRay {
            squares: [Square::from_u8(0); BOARD_SIZE - 1],
            len: 0,
        }
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares[..self.len as usize]
    }
}

const fn rook_rays() -> [[RookRay; 4]; NUM_SQUARES] {
    let mut rays = [[RookRay::empty(); 4]; NUM_SQUARES];
    let mut i = 0;
    while i < NUM_SQUARES {
        let square = Square::from_u8(i as u8);
        let mut d = 0;
        while d < 4 {
            let direction = Direction::ALL[d];
            let mut steps = 1;
            while let Some(to) = square.rook_move(direction, steps) {
                rays[i][d].squares[steps as usize - 1] = to;
                steps += 1;
            }
            rays[i][d].len = steps - 1;
            d += 1;
        }
        i += 1;
    }
    rays
}

/// Rook moves on an empty board, indexed by square and direction.
pub static ROOK_RAYS: [[RookRay; 4]; NUM_SQUARES] = rook_rays();
