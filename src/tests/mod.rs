#[cfg(test)]
mod move_gen_tests;
#[cfg(test)]
mod search_tests;

#[cfg(test)]
use crate::board::{Board, Move, Piece, Square};
#[cfg(test)]
use board_game_traits::Color;

#[cfg(test)]
fn do_moves_and_check_validity(board: &mut Board, move_strings: &[&str]) {
    for move_string in move_strings.iter() {
        let mv: Move = move_string.parse().unwrap();
        let moves = board.legal_moves(board.turn());
        assert!(
            moves.contains(&mv),
            "Move {} was not among legal moves: {:?}\n{:?}",
            mv,
            moves,
            board
        );
        board.make_move(mv);
    }
}

/// An otherwise empty board with the given pieces, and a history starting at this position.
#[cfg(test)]
fn board_with_pieces(turn: Color, king: &str, white: &[&str], black: &[&str]) -> Board {
    let mut board = Board::empty();
    board.put(Piece::King, sq(king));
    for square in white {
        board.put(Piece::White, sq(square));
    }
    for square in black {
        board.put(Piece::Black, sq(square));
    }
    board.set_turn(turn);
    board.clear_undo();
    board
}

#[cfg(test)]
fn sq(name: &str) -> Square {
    name.parse().unwrap()
}
