//! A very simple implementation of the minmax search algorithm, without any pruning.
//! It scores positions exactly like the alpha-beta search in `search`, which makes it
//! useful for testing that search. It also makes for a weak opponent.

use board_game_traits::{Color, Position as PositionTrait};
use rand::Rng;

use crate::board::{Board, Move};
use crate::error::TablutError;
use crate::search::{eval, result_score, sense_of, Score, FUTURE_MOVE_PENALTY, INFINITY};

/// Returns the best move and its score, searching `depth` plies deep and scoring the
/// positions at the horizon with `static_eval`. Of equally scored moves, the first one
/// generated is returned. The position is restored before returning.
pub fn minmax<B, F>(
    position: &mut B,
    depth: u32,
    static_eval: &mut F,
) -> Result<(Option<B::Move>, Score), TablutError>
where
    B: PositionTrait,
    F: FnMut(&B) -> Score,
{
    if let Some(score) = result_score(position.game_result())? {
        return Ok((None, score));
    }
    let root_sense = sense_of(position.side_to_move());
    minmax_ply(position, 0, depth, root_sense, static_eval)
}

/// Minmax over a Tablut board with the regular static evaluator.
pub fn minmax_board<R: Rng>(
    board: &Board,
    depth: u32,
    jitter: Score,
    rng: &mut R,
) -> Result<(Option<Move>, Score), TablutError> {
    let mut position = board.clone();
    minmax(&mut position, depth, &mut |board: &Board| {
        eval::static_score(board, jitter, rng)
    })
}

fn minmax_ply<B, F>(
    position: &mut B,
    ply: u32,
    depth: u32,
    root_sense: Score,
    static_eval: &mut F,
) -> Result<(Option<B::Move>, Score), TablutError>
where
    B: PositionTrait,
    F: FnMut(&B) -> Score,
{
    if ply == depth {
        return Ok((None, static_eval(position)));
    }
    let sense = sense_of(position.side_to_move());
    let mut best: (Option<B::Move>, Score) = (None, -sense * INFINITY);

    let mut moves = vec![];
    position.generate_moves(&mut moves);
    for mv in moves {
        let reverse_move = position.do_move(mv.clone());
        let score = match result_score(position.game_result()) {
            Ok(Some(score)) => Ok(score),
            Ok(None) => minmax_ply(position, ply + 1, depth, root_sense, static_eval)
                .map(|(_, score)| root_sense * FUTURE_MOVE_PENALTY * ply as Score + score),
            Err(err) => Err(err),
        };
        position.reverse_move(reverse_move);
        let score = score?;

        let improves = match position.side_to_move() {
            Color::White => score > best.1,
            Color::Black => score < best.1,
        };
        if improves {
            best = (Some(mv), score);
        }
    }
    Ok(best)
}
