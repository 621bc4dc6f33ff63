use board_game_traits::Color;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{board_with_pieces, sq};
use crate::board::{Board, Move, Piece, THRONE};

#[test]
fn start_position_move_counts_test() {
    let board = Board::default();
    assert_eq!(board.legal_moves(Color::Black).len(), 80);
    // Generated regardless of whose turn it is. The king is boxed in.
    assert_eq!(board.legal_moves(Color::White).len(), 56);
    assert!(board
        .legal_moves(Color::White)
        .iter()
        .all(|mv| mv.from() != THRONE && mv.to() != THRONE));
}

#[test]
fn start_position_move_order_test() {
    let board = Board::default();
    let black_moves: Vec<String> = board
        .legal_moves(Color::Black)
        .iter()
        .take(6)
        .map(|mv| mv.to_string())
        .collect();
    assert_eq!(
        black_moves,
        vec!["d1-d2", "d1-d3", "d1-d4", "d1-c1", "d1-b1", "d1-a1"]
    );
    assert_eq!(
        board.legal_moves(Color::White)[0],
        "e3-f3".parse::<Move>().unwrap()
    );
}

#[test]
fn king_moves_come_first_test() {
    let board = board_with_pieces(Color::White, "c3", &["a1"], &["c5", "h8"]);
    let moves = board.legal_moves(Color::White);
    let king_moves: Vec<String> = moves
        .iter()
        .take_while(|mv| mv.from() == sq("c3"))
        .map(|mv| mv.to_string())
        .collect();
    assert_eq!(
        king_moves,
        vec![
            "c3-c4", "c3-d3", "c3-e3", "c3-f3", "c3-g3", "c3-h3", "c3-i3", "c3-c2", "c3-c1",
            "c3-b3", "c3-a3"
        ]
    );
    assert!(moves[king_moves.len()..]
        .iter()
        .all(|mv| mv.from() == sq("a1")));
}

#[test]
fn king_may_cross_throne_test() {
    let board = board_with_pieces(Color::White, "e3", &[], &["a1"]);
    let moves = board.legal_moves(Color::White);
    assert!(moves.contains(&"e3-e5".parse().unwrap()));
    assert!(moves.contains(&"e3-e9".parse().unwrap()));
}

#[test]
fn pieces_stop_before_throne_test() {
    let board = board_with_pieces(Color::Black, "a9", &[], &["e2", "b5"]);
    let moves = board.legal_moves(Color::Black);
    assert!(moves.contains(&"e2-e4".parse().unwrap()));
    assert!(!moves.contains(&"e2-e5".parse().unwrap()));
    assert!(!moves.contains(&"e2-e6".parse().unwrap()));
    assert!(moves.contains(&"b5-d5".parse().unwrap()));
    assert!(!moves.contains(&"b5-f5".parse().unwrap()));
}

#[test]
fn generate_moves_appends_test() {
    let board = Board::default();
    let mut moves = vec![];
    board.generate_moves_for(Color::Black, &mut moves);
    board.generate_moves_for(Color::White, &mut moves);
    assert_eq!(moves.len(), 136);
}

#[test]
fn random_games_move_gen_test() {
    let mut rng = SmallRng::seed_from_u64(17);
    for _ in 0..50 {
        let mut board = Board::default();
        while board.winner().is_none() && board.move_count() < 300 {
            let side = board.turn();
            let moves = board.legal_moves(side);
            assert_eq!(board.has_move(side), !moves.is_empty());
            assert_eq!(
                board.has_move(!side),
                !board.legal_moves(!side).is_empty()
            );

            for mv in moves.iter() {
                assert!(board.is_legal_move(*mv), "{} is not legal\n{:?}", mv, board);
                assert!(mv.path().all(|square| board[square] == Piece::Empty));
                if mv.to() == THRONE {
                    assert_eq!(board[mv.from()], Piece::King);
                }
            }

            let mv = *moves.choose(&mut rng).unwrap();
            board.make_move(mv);
        }
        if board.winner().is_some() {
            assert!(board
                .legal_moves(board.turn())
                .iter()
                .all(|mv| !board.is_legal_move(*mv)));
        }
    }
}
