//! Heuristic evaluation of positions at the search horizon.

use board_game_traits::Color;
use rand::Rng;

use crate::board::{Board, Direction, Piece, Square, THRONE};

use super::{Score, WILL_WIN_VALUE, WINNING_VALUE};

/// Value of each white piece, including the king
pub const WHITE_PIECE_VALUE: Score = 300;
pub const BLACK_PIECE_VALUE: Score = 250;
/// Bonus when the king has exactly one way to reach the edge
pub const WHITE_CLOSE_TO_WIN: Score = 10_000;
/// Penalty unit for black pieces next to the king
pub const BLACK_CLOSE_TO_WIN: Score = 5_000;

/// Static score of `board`, from white's perspective.
///
/// Random noise in `0..jitter` is both added and subtracted, so that games using the same heuristic vary.
pub fn static_score<R: Rng>(board: &Board, jitter: Score, rng: &mut R) -> Score {
    let Some(king) = board.king_position() else {
        return -WINNING_VALUE;
    };
    let mut score = material_score(board);

    match king_escape_routes(board, king) {
        0 => (),
        1 => score += WHITE_CLOSE_TO_WIN,
        _ => return WILL_WIN_VALUE,
    }

    score -= encirclement_factor(board, king) * BLACK_CLOSE_TO_WIN;

    if jitter > 0 {
        score += rng.gen_range(0..jitter);
        score -= rng.gen_range(0..jitter);
    }
    score
}

pub fn material_score(board: &Board) -> Score {
    board.piece_locations(Color::White).count() as Score * WHITE_PIECE_VALUE
        - board.piece_locations(Color::Black).count() as Score * BLACK_PIECE_VALUE
}

/// Number of king moves that end on an edge square
pub fn king_escape_routes(board: &Board, king: Square) -> usize {
    Direction::ALL
        .into_iter()
        .map(|direction| {
            king.rook_ray(direction)
                .iter()
                .take_while(|square| board[**square].is_empty())
                .filter(|square| square.is_edge())
                .count()
        })
        .sum()
}

/// Grows threefold with each black piece next to the king: 0, 1, 3, 9, 27.
/// Always 0 while the king is on the throne.
pub fn encirclement_factor(board: &Board, king: Square) -> Score {
    if king == THRONE {
        return 0;
    }
    king.neighbours()
        .filter(|square| board[*square] == Piece::Black)
        .fold(0, |factor, _| if factor == 0 { 1 } else { factor * 3 })
}
