use std::{fmt, ops};

use super::square::{Square, BOARD_SIZE, NUM_SQUARES};

/// A set of squares, one bit per square index.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct BitBoard {
    pub board: u128,
}

impl ops::BitOr for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitor(self, rhs: BitBoard) -> BitBoard {
        BitBoard::from_u128(self.board | rhs.board)
    }
}

impl BitBoard {
    #[inline]
    pub const fn empty() -> Self {
        BitBoard { board: 0 }
    }

    #[inline]
    pub const fn from_u128(n: u128) -> Self {
        BitBoard {
            board: n & ((1 << NUM_SQUARES) - 1),
        }
    }

    #[inline]
    pub fn get(self, i: u8) -> bool {
        debug_assert!((i as usize) < NUM_SQUARES);
        self.board & (1 << i) != 0
    }

    #[inline]
    pub fn contains(self, square: Square) -> bool {
        self.get(square.into_inner())
    }

    // Sets the square to true
    #[inline]
    pub fn set(self, i: u8) -> Self {
        debug_assert!((i as usize) < NUM_SQUARES);
        BitBoard::from_u128(self.board | 1 << i)
    }

    // Sets the square to false
    #[inline]
    pub fn clear(self, i: u8) -> Self {
        debug_assert!((i as usize) < NUM_SQUARES);
        BitBoard::from_u128(self.board & !(1 << i))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.board == 0
    }

    #[inline]
    pub fn count(self) -> u8 {
        self.board.count_ones() as u8
    }
}

impl IntoIterator for BitBoard {
    type Item = Square;
    type IntoIter = BitBoardIter;

    fn into_iter(self) -> Self::IntoIter {
        BitBoardIter { board: self }
    }
}

impl FromIterator<Square> for BitBoard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter()
            .fold(BitBoard::empty(), |board, square| board.set(square.into_inner()))
    }
}

pub struct BitBoardIter {
    board: BitBoard,
}

impl Iterator for BitBoardIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.board.is_empty() {
            None
        } else {
            let i = self.board.board.trailing_zeros() as u8;
            self.board = self.board.clear(i);
            Some(Square::from_u8(i))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.board.count() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BitBoardIter {}

impl fmt::Debug for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (0..BOARD_SIZE).rev() {
            let bits = (self.board >> (row * BOARD_SIZE)) as u16 & 0x1ff;
            writeln!(f, "{:09b}", bits.reverse_bits() >> 7)?;
        }
        Ok(())
    }
}
