use std::fmt;
use std::str::FromStr;

use super::square::Square;
use super::Direction;

/// A rook move from one square to another. Whether it is legal depends on the position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    /// Returns `None` unless `from` and `to` are distinct squares on the same row or column.
    pub const fn new(from: Square, to: Square) -> Option<Self> {
        if from.direction_to(to).is_some() {
            Some(Move { from, to })
        } else {
            None
        }
    }

    /// Caller guarantees that `from` and `to` form a rook move.
    pub(crate) const fn new_unchecked(from: Square, to: Square) -> Self {
        debug_assert!(from.direction_to(to).is_some());
        Move { from, to }
    }

    pub const fn from(self) -> Square {
        self.from
    }

    pub const fn to(self) -> Square {
        self.to
    }

    pub fn direction(self) -> Direction {
        // Construction guarantees a rook move
        self.from.direction_to(self.to).unwrap_or(Direction::North)
    }

    /// The squares the moving piece passes over, excluding the origin and including the destination.
    pub fn path(self) -> impl Iterator<Item = Square> {
        let len = self.from.distance(self.to) as usize;
        self.from.rook_ray(self.direction()).iter().copied().take(len)
    }

    pub fn from_string(input: &str) -> Result<Self, pgn_traits::Error> {
        if !input.is_ascii() {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse move \"{}\": input contained non-ascii characters",
                input
            )));
        }
        let (from, to) = input.trim().split_once('-').ok_or_else(|| {
            pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse move \"{}\": expected <square>-<square>",
                input
            ))
        })?;
        let from = Square::parse_square(from)?;
        let to = Square::parse_square(to)?;
        Move::new(from, to).ok_or_else(|| {
            pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse move \"{}\": not a rook move",
                input
            ))
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Move::from_string(input)
    }
}
