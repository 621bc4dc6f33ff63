use board_game_traits::{Color, GameResult};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{board_with_pieces, do_moves_and_check_validity, sq};
use crate::board::{Board, Move};
use crate::error::TablutError;
use crate::minmax::{minmax, minmax_board};
use crate::search::eval::{
    encirclement_factor, king_escape_routes, material_score, static_score,
};
use crate::search::{
    random_move, result_score, Ai, AiSettings, WILL_WIN_VALUE, WINNING_VALUE,
};

fn exact_settings(depth: u32) -> AiSettings {
    AiSettings::default()
        .base_depth(depth)
        .endgame_piece_count(0)
        .jitter(0)
}

/// Positions from random games, none of them finished
fn random_positions(seed: u64, count: usize) -> Vec<Board> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut positions = vec![];
    while positions.len() < count {
        let mut board = Board::default();
        let plies = positions.len() * 7 + 5;
        for _ in 0..plies {
            let mv = *board.legal_moves(board.turn()).choose(&mut rng).unwrap();
            board.make_move(mv);
            if board.winner().is_some() {
                break;
            }
        }
        if board.winner().is_none() {
            positions.push(board);
        }
    }
    positions
}

#[test]
fn default_settings_test() {
    let settings = AiSettings::default();
    assert_eq!(settings.get_base_depth(), 2);
    assert_eq!(settings.get_endgame_piece_count(), 20);
    assert_eq!(settings.get_jitter(), 5);
    assert!(!settings.is_random_play());

    let ai = Ai::default();
    assert_eq!(ai.max_depth(), 2);
    assert_eq!(ai.settings(), &settings);
}

#[test]
fn black_captures_king_test() {
    let board = board_with_pieces(Color::Black, "e5", &["b7"], &["e6", "e4", "h5", "d5"]);
    let mut ai = Ai::new(AiSettings::default().jitter(0));
    let mut rng = SmallRng::seed_from_u64(0);
    let (mv, score) = ai.find_move_with_score(&board, &mut rng).unwrap();
    assert_eq!(mv, Some("h5-f5".parse().unwrap()));
    assert_eq!(score, -WINNING_VALUE);
}

#[test]
fn white_escapes_with_king_test() {
    let board = board_with_pieces(Color::White, "c3", &[], &["h8", "i1"]);
    let mut ai = Ai::new(AiSettings::default().jitter(0));
    let mut rng = SmallRng::seed_from_u64(0);
    let (mv, score) = ai.find_move_with_score(&board, &mut rng).unwrap();
    assert_eq!(mv, Some("c3-c9".parse().unwrap()));
    assert_eq!(score, WINNING_VALUE);
}

#[test]
fn white_avoids_losing_move_test() {
    let board = board_with_pieces(
        Color::White,
        "c3",
        &["d3", "c4", "h8"],
        &["b3", "c2", "d6", "i3", "a4"],
    );
    for seed in 0..4 {
        let mut ai = Ai::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mv = ai.find_move(&board, &mut rng).unwrap().unwrap();

        let mut after = board.clone();
        after.make_move(mv);
        assert_eq!(after.winner(), None);
        for reply in after.legal_moves(Color::Black) {
            let mut child = after.clone();
            child.make_move(reply);
            assert_ne!(
                child.game_result(),
                Some(GameResult::BlackWin),
                "{} loses to {}",
                mv,
                reply
            );
        }
    }
}

#[test]
fn alpha_beta_matches_minmax_test() {
    let mut rng = SmallRng::seed_from_u64(1);
    for board in random_positions(3, 6) {
        let mut ai = Ai::new(exact_settings(2));
        let alpha_beta = ai.find_move_with_score(&board, &mut rng).unwrap();
        let full_width = minmax_board(&board, 2, 0, &mut rng).unwrap();
        assert_eq!(alpha_beta, full_width, "Searches differ on\n{:?}", board);
    }
}

#[test]
fn alpha_beta_matches_minmax_depth_3_test() {
    let mut rng = SmallRng::seed_from_u64(2);
    for mut board in random_positions(5, 2) {
        board.clear_undo();
        let mut ai = Ai::new(exact_settings(3));
        let alpha_beta = ai.find_move_with_score(&board, &mut rng).unwrap();
        let full_width = minmax_board(&board, 3, 0, &mut rng).unwrap();
        assert_eq!(alpha_beta, full_width, "Searches differ on\n{:?}", board);
    }
}

#[test]
fn minmax_restores_position_test() {
    let mut board = random_positions(13, 1).remove(0);
    let encoded = board.encoded_board();
    let move_count = board.move_count();
    let mut rng = SmallRng::seed_from_u64(0);

    let expected = Ai::new(exact_settings(2))
        .find_move_with_score(&board, &mut rng)
        .unwrap();
    let result = minmax(&mut board, 2, &mut |board: &Board| {
        static_score(board, 0, &mut rng)
    })
    .unwrap();

    assert_eq!(result, expected);
    assert_eq!(board.encoded_board(), encoded);
    assert_eq!(board.move_count(), move_count);
    assert_eq!(board.winner(), None);
}

#[test]
fn draw_is_invalid_winner_test() {
    assert!(matches!(
        result_score(Some(GameResult::Draw)),
        Err(TablutError::InvalidWinner)
    ));
    assert_eq!(result_score(None).unwrap(), None);
    assert_eq!(
        result_score(Some(GameResult::WhiteWin)).unwrap(),
        Some(WINNING_VALUE)
    );
}

#[test]
fn depth_increases_once_in_endgame_test() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut ai = Ai::default();
    ai.find_move(&Board::default(), &mut rng).unwrap();
    assert_eq!(ai.max_depth(), 2);

    let board = board_with_pieces(Color::White, "e5", &["a1", "b2"], &["h8", "h7", "g2"]);
    ai.find_move(&board, &mut rng).unwrap();
    assert_eq!(ai.max_depth(), 3);
    ai.find_move(&board, &mut rng).unwrap();
    assert_eq!(ai.max_depth(), 3);
}

#[test]
fn finished_game_has_no_move_test() {
    let mut board = board_with_pieces(Color::Black, "c3", &["a9"], &["b3", "d8"]);
    do_moves_and_check_validity(&mut board, &["d8-d3"]);
    assert_eq!(board.winner(), Some(Color::Black));

    let mut rng = SmallRng::seed_from_u64(0);
    let mut ai = Ai::default();
    assert_eq!(ai.find_move(&board, &mut rng).unwrap(), None);
    assert_eq!(
        ai.find_move_with_score(&board, &mut rng).unwrap(),
        (None, -WINNING_VALUE)
    );
    assert_eq!(minmax_board(&board, 2, 0, &mut rng).unwrap(), (None, -WINNING_VALUE));

    let mut random_ai = Ai::new(AiSettings::default().random_play(true));
    assert_eq!(random_ai.find_move(&board, &mut rng).unwrap(), None);
}

#[test]
fn random_play_test() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut ai = Ai::new(AiSettings::default().random_play(true));
    let mut board = Board::default();
    for _ in 0..20 {
        let mv: Move = ai.find_move(&board, &mut rng).unwrap().unwrap();
        assert!(board.is_legal_move(mv));
        board.make_move(mv);
        if board.winner().is_some() {
            break;
        }
    }
    let mv = random_move(&Board::default(), &mut rng).unwrap();
    assert!(Board::default().is_legal_move(mv));
}

#[test]
fn search_does_not_modify_board_test() {
    let board = random_positions(11, 1).remove(0);
    let encoded = board.encoded_board();
    let mut rng = SmallRng::seed_from_u64(0);
    Ai::default().find_move(&board, &mut rng).unwrap();
    assert_eq!(board.encoded_board(), encoded);
}

#[test]
fn start_position_score_test() {
    let board = Board::default();
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(material_score(&board), 9 * 300 - 16 * 250);
    assert_eq!(king_escape_routes(&board, sq("e5")), 0);
    assert_eq!(encirclement_factor(&board, sq("e5")), 0);
    assert_eq!(static_score(&board, 0, &mut rng), -1300);
}

#[test]
fn king_escape_routes_test() {
    let board = board_with_pieces(Color::White, "a5", &[], &["h8"]);
    // Four squares along the a-file, and i5
    assert_eq!(king_escape_routes(&board, sq("a5")), 9);

    let board = board_with_pieces(Color::White, "c7", &[], &["c8", "d7", "c6"]);
    assert_eq!(king_escape_routes(&board, sq("c7")), 1);
}

#[test]
fn static_score_test() {
    let mut rng = SmallRng::seed_from_u64(0);

    let open = board_with_pieces(Color::White, "c7", &[], &["h2"]);
    assert_eq!(static_score(&open, 0, &mut rng), WILL_WIN_VALUE);

    let enclosed = board_with_pieces(Color::White, "c7", &[], &["c8", "d7", "c6"]);
    assert_eq!(encirclement_factor(&enclosed, sq("c7")), 9);
    assert_eq!(
        static_score(&enclosed, 0, &mut rng),
        300 - 3 * 250 + 10_000 - 9 * 5_000
    );

    let mut no_king = enclosed.clone();
    no_king.put(crate::board::Piece::Empty, sq("c7"));
    assert_eq!(static_score(&no_king, 0, &mut rng), -WINNING_VALUE);
}

#[test]
fn encirclement_factor_test() {
    let mut board = board_with_pieces(Color::White, "c3", &[], &["h8"]);
    let mut factors = vec![encirclement_factor(&board, sq("c3"))];
    for square in ["c4", "d3", "c2", "b3"] {
        board.put(crate::board::Piece::Black, sq(square));
        factors.push(encirclement_factor(&board, sq("c3")));
    }
    assert_eq!(factors, vec![0, 1, 3, 9, 27]);
}

#[test]
fn jitter_bounds_test() {
    let board = Board::default();
    let mut rng = SmallRng::seed_from_u64(4);
    let exact = static_score(&board, 0, &mut rng);
    for _ in 0..100 {
        let score = static_score(&board, 5, &mut rng);
        assert!((exact - 4..=exact + 4).contains(&score));
    }
}
