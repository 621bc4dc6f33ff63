//! A Tablut AI based on depth-limited minimax search with alpha-beta pruning.
//!
//! The search deepens by one ply, once, when the number of pieces left on the board first
//! drops below a threshold. Positions at the search horizon are scored by the heuristic in `eval`.

use board_game_traits::{Color, GameResult};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Move};
use crate::error::TablutError;

pub mod eval;

/// Position score. Positive scores favour white.
pub type Score = i64;

/// A magnitude greater than any score.
pub const INFINITY: Score = i32::MAX as Score;
/// Score magnitude of a won game.
pub const WINNING_VALUE: Score = INFINITY - 20;
/// Score magnitude of a game that will be won on the next move. Smaller than
/// `WINNING_VALUE`, so that wins are not put off.
pub const WILL_WIN_VALUE: Score = INFINITY - 40;
/// Added to scores for each ply of search below the root, times the root side's sign,
/// so that quicker wins are preferred.
pub const FUTURE_MOVE_PENALTY: Score = -1000;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AiSettings {
    base_depth: u32,
    endgame_piece_count: u8,
    jitter: Score,
    random_play: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        AiSettings {
            base_depth: 2,
            endgame_piece_count: 20,
            jitter: 5,
            random_play: false,
        }
    }
}

impl AiSettings {
    /// The search depth before the endgame
    pub fn base_depth(mut self, base_depth: u32) -> Self {
        assert!(base_depth > 0);
        self.base_depth = base_depth;
        self
    }

    /// Search one ply deeper once there are fewer than this many pieces on the board
    pub fn endgame_piece_count(mut self, endgame_piece_count: u8) -> Self {
        self.endgame_piece_count = endgame_piece_count;
        self
    }

    /// Exclusive bound of the random noise added to, and subtracted from, each static evaluation.
    /// Zero disables the noise.
    pub fn jitter(mut self, jitter: Score) -> Self {
        assert!(jitter >= 0);
        self.jitter = jitter;
        self
    }

    /// Play uniformly random moves instead of searching
    pub fn random_play(mut self, random_play: bool) -> Self {
        self.random_play = random_play;
        self
    }

    pub fn get_base_depth(&self) -> u32 {
        self.base_depth
    }

    pub fn get_endgame_piece_count(&self) -> u8 {
        self.endgame_piece_count
    }

    pub fn get_jitter(&self) -> Score {
        self.jitter
    }

    pub fn is_random_play(&self) -> bool {
        self.random_play
    }
}

/// The sign of scores that are good for `color`
pub const fn sense_of(color: Color) -> Score {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Score of a finished game, or `None` if the game is still going.
pub(crate) fn game_over_score(board: &Board) -> Result<Option<Score>, TablutError> {
    result_score(board.game_result())
}

/// Score of a game result. Tablut games always have a winner, so a draw is an error.
pub fn result_score(result: Option<GameResult>) -> Result<Option<Score>, TablutError> {
    match result {
        None => Ok(None),
        Some(GameResult::WhiteWin) => Ok(Some(WINNING_VALUE)),
        Some(GameResult::BlackWin) => Ok(Some(-WINNING_VALUE)),
        Some(GameResult::Draw) => Err(TablutError::InvalidWinner),
    }
}

/// A uniformly random move for the side to move, if it has any.
pub fn random_move<R: Rng>(board: &Board, rng: &mut R) -> Option<Move> {
    board.legal_moves(board.turn()).choose(rng).copied()
}

/// An AI player. It keeps its search depth between calls, so one instance should be used for a whole game.
#[derive(Clone, Debug)]
pub struct Ai {
    settings: AiSettings,
    max_depth: u32,
    depth_increased: bool,
    last_found_move: Option<Move>,
    root_sense: Score,
}

impl Default for Ai {
    fn default() -> Self {
        Ai::new(AiSettings::default())
    }
}

impl Ai {
    pub fn new(settings: AiSettings) -> Self {
        Ai {
            max_depth: settings.base_depth,
            settings,
            depth_increased: false,
            last_found_move: None,
            root_sense: 1,
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// The current maximum search depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Chooses a move for the side to move. Returns `None` if the game is over, or the side has no moves.
    /// The board itself is never modified.
    pub fn find_move<R: Rng>(
        &mut self,
        board: &Board,
        rng: &mut R,
    ) -> Result<Option<Move>, TablutError> {
        if self.settings.random_play {
            if board.winner().is_some() {
                return Ok(None);
            }
            return Ok(random_move(board, rng));
        }
        self.find_move_with_score(board, rng).map(|(mv, _)| mv)
    }

    /// Searches the position, returning the best move and its score.
    pub fn find_move_with_score<R: Rng>(
        &mut self,
        board: &Board,
        rng: &mut R,
    ) -> Result<(Option<Move>, Score), TablutError> {
        if let Some(score) = game_over_score(board)? {
            return Ok((None, score));
        }
        let sense = sense_of(board.turn());
        self.root_sense = sense;
        self.last_found_move = None;
        let score = self.search(board, 0, true, sense, -INFINITY, INFINITY, rng)?;

        match self.last_found_move {
            Some(mv) => debug!(
                "{} plays {} with score {} at depth {}",
                board.turn(),
                mv,
                score,
                self.max_depth
            ),
            None => debug!("{} has no moves", board.turn()),
        }
        Ok((self.last_found_move, score))
    }

    /// Returns the value of `board`, searching to the maximum depth. Only the root call,
    /// with `save_move` set, records its best move.
    /// White maximizes the score, black minimizes it. Of moves with equal scores, the first one
    /// generated is kept.
    #[allow(clippy::too_many_arguments)]
    fn search<R: Rng>(
        &mut self,
        board: &Board,
        depth: u32,
        save_move: bool,
        sense: Score,
        mut alpha: Score,
        mut beta: Score,
        rng: &mut R,
    ) -> Result<Score, TablutError> {
        if depth == self.update_max_depth(board) {
            return Ok(eval::static_score(board, self.settings.jitter, rng));
        }
        let mut score = -sense * INFINITY;
        let side = if sense > 0 { Color::White } else { Color::Black };

        for mv in board.legal_moves(side) {
            let mut child = board.clone();
            child.make_move(mv);
            let child_score = match game_over_score(&child)? {
                Some(game_over_score) => game_over_score,
                None => {
                    let penalty = self.root_sense * FUTURE_MOVE_PENALTY * depth as Score;
                    // The child scores without the penalty, so the window is shifted to match
                    penalty
                        + self.search(
                            &child,
                            depth + 1,
                            false,
                            -sense,
                            alpha - penalty,
                            beta - penalty,
                            rng,
                        )?
                }
            };

            if side == Color::White {
                if child_score > score {
                    score = child_score;
                    if save_move {
                        self.last_found_move = Some(mv);
                    }
                }
                alpha = alpha.max(score);
            } else {
                if child_score < score {
                    score = child_score;
                    if save_move {
                        self.last_found_move = Some(mv);
                    }
                }
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(score)
    }

    /// The maximum depth for searching `board`, increasing it permanently the first time
    /// the board has few pieces left.
    fn update_max_depth(&mut self, board: &Board) -> u32 {
        if !self.depth_increased && board.piece_count() < self.settings.endgame_piece_count {
            self.depth_increased = true;
            self.max_depth += 1;
            debug!(
                "{} pieces left, increasing search depth to {}",
                board.piece_count(),
                self.max_depth
            );
        }
        self.max_depth
    }
}
