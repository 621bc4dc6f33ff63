//! Tablut rules: board representation, move generation, captures, win detection and undo.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use arrayvec::ArrayVec;
use board_game_traits::{Color, GameResult, Position as PositionTrait};
use lazy_static::lazy_static;
use log::trace;
use rand::{Rng, SeedableRng};

pub use bitboard::BitBoard;
pub use mv::Move;
pub use piece::Piece;
pub use square::{
    squares_iterator, RookRay, Square, BOARD_SIZE, ETHRONE, NTHRONE, NUM_SQUARES, ROOK_RAYS,
    STHRONE, SURROUNDING_THRONE, THRONE, WTHRONE,
};

use crate::error::TablutError;

pub mod bitboard;
mod mv;
mod piece;
mod square;

/// One of the four rook directions. The discriminant is the direction's index in move tables,
/// and the order of `ALL` is the order moves are generated in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

const INITIAL_ATTACKERS: [Square; 16] = [
    Square::from_col_row(0, 3),
    Square::from_col_row(0, 4),
    Square::from_col_row(0, 5),
    Square::from_col_row(1, 4),
    Square::from_col_row(8, 3),
    Square::from_col_row(8, 4),
    Square::from_col_row(8, 5),
    Square::from_col_row(7, 4),
    Square::from_col_row(3, 0),
    Square::from_col_row(4, 0),
    Square::from_col_row(5, 0),
    Square::from_col_row(4, 1),
    Square::from_col_row(3, 8),
    Square::from_col_row(4, 8),
    Square::from_col_row(5, 8),
    Square::from_col_row(4, 7),
];

const INITIAL_DEFENDERS: [Square; 8] = [
    NTHRONE,
    ETHRONE,
    STHRONE,
    WTHRONE,
    Square::from_col_row(4, 6),
    Square::from_col_row(4, 2),
    Square::from_col_row(2, 4),
    Square::from_col_row(6, 4),
];

lazy_static! {
    static ref ZOBRIST_KEYS: ZobristKeys = ZobristKeys::new();
}

struct ZobristKeys {
    pieces: [[u64; 4]; NUM_SQUARES],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = rand::rngs::StdRng::from_seed([0; 32]);
        let mut pieces = [[0; 4]; NUM_SQUARES];
        for square_keys in pieces.iter_mut() {
            // An empty square hashes to zero
            for key in square_keys.iter_mut().skip(1) {
                *key = rng.gen();
            }
        }
        ZobristKeys { pieces }
    }
}

fn zobrist_piece(square: Square, piece: Piece) -> u64 {
    ZOBRIST_KEYS.pieces[square.index()][piece.disc()]
}

/// A recorded arrangement of pieces. Turn and move count are not part of it.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Snapshot {
    cells: [Piece; NUM_SQUARES],
    king_position: Option<Square>,
    hash: u64,
}

/// Complete representation of a Tablut game in progress
#[derive(Clone)]
pub struct Board {
    cells: [Piece; NUM_SQUARES],
    king_position: Option<Square>,
    turn: Color,
    move_count: usize,
    move_limit: Option<usize>,
    winner: Option<Color>,
    repeated: bool,
    hash: u64, // Zobrist hash of the current arrangement
    history: Vec<Snapshot>, // One snapshot per recorded mutation, the last one is the current position
    seen: HashMap<u64, u32>, // How many times each hash occurs in `history`
    white_squares: BitBoard,
    black_squares: BitBoard,
}

impl Default for Board {
    fn default() -> Self {
        let mut board = Board::empty();
        board.init();
        board
    }
}

impl Index<Square> for Board {
    type Output = Piece;

    fn index(&self, square: Square) -> &Self::Output {
        &self.cells[square.index()]
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..BOARD_SIZE as u8).rev() {
            write!(f, "{:2}", row + 1)?;
            for col in 0..BOARD_SIZE as u8 {
                write!(f, " {}", self[Square::from_col_row(col, row)])?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for col in 'a'..='i' {
            write!(f, " {}", col)?;
        }
        writeln!(f)?;
        writeln!(f, "{} to move, {} moves played.", self.turn, self.move_count)?;
        if let Some(winner) = self.winner {
            writeln!(
                f,
                "{} has won{}.",
                winner,
                if self.repeated {
                    " by repetition"
                } else {
                    ""
                }
            )?;
        }
        Ok(())
    }
}

impl Board {
    /// The starting position: 16 attackers, 8 defenders and the king on the throne, black to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// A board without any pieces, black to move. Used to set up positions.
    pub fn empty() -> Self {
        let cells = [Piece::Empty; NUM_SQUARES];
        let snapshot = Snapshot {
            cells,
            king_position: None,
            hash: 0,
        };
        let mut seen = HashMap::new();
        seen.insert(snapshot.hash, 1);
        Board {
            cells,
            king_position: None,
            turn: Color::Black,
            move_count: 0,
            move_limit: None,
            winner: None,
            repeated: false,
            hash: 0,
            history: vec![snapshot],
            seen,
            white_squares: BitBoard::empty(),
            black_squares: BitBoard::empty(),
        }
    }

    /// Reads a board from the format produced by `encoded_board`. The history starts at the given position.
    pub fn from_encoded(encoded: &str) -> Result<Self, pgn_traits::Error> {
        let mut chars = encoded.chars();
        let turn = match chars.next() {
            Some('W') => Color::White,
            Some('B') => Color::Black,
            ch => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Couldn't parse board \"{}\": bad side to move {:?}",
                    encoded, ch
                )))
            }
        };
        let pieces = chars
            .map(|ch| {
                Piece::from_symbol(ch).ok_or_else(|| {
                    pgn_traits::Error::new_parse_error(format!(
                        "Couldn't parse board \"{}\": unexpected '{}'",
                        encoded, ch
                    ))
                })
            })
            .collect::<Result<Vec<Piece>, _>>()?;
        if pieces.len() != NUM_SQUARES {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse board \"{}\": expected {} squares, got {}",
                encoded,
                NUM_SQUARES,
                pieces.len()
            )));
        }
        if pieces.iter().filter(|piece| **piece == Piece::King).count() > 1 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse board \"{}\": more than one king",
                encoded
            )));
        }
        let mut board = Board::empty();
        for (square, piece) in squares_iterator().zip(pieces) {
            board.put(piece, square);
        }
        board.turn = turn;
        board.clear_undo();
        Ok(board)
    }

    /// Resets the board to the starting position, with no move limit.
    pub fn init(&mut self) {
        self.cells = [Piece::Empty; NUM_SQUARES];
        self.king_position = None;
        self.hash = 0;
        self.white_squares = BitBoard::empty();
        self.black_squares = BitBoard::empty();
        self.history.clear();
        self.seen.clear();

        for square in INITIAL_ATTACKERS {
            self.put(Piece::Black, square);
        }
        for square in INITIAL_DEFENDERS {
            self.put(Piece::White, square);
        }
        self.put(Piece::King, THRONE);
        self.record();

        self.turn = Color::Black;
        self.repeated = false;
        self.winner = None;
        self.move_count = 0;
        self.move_limit = None;
    }

    /// Limit each side to `limit` moves. Fails if the limit has already been reached.
    pub fn set_move_limit(&mut self, limit: usize) -> Result<(), TablutError> {
        if 2 * limit <= self.move_count {
            return Err(TablutError::InvalidConfiguration(format!(
                "move limit {} already exceeded after {} moves",
                limit, self.move_count
            )));
        }
        self.move_limit = Some(limit);
        Ok(())
    }

    pub fn move_limit(&self) -> Option<usize> {
        self.move_limit
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Sets the side to move. Used to set up positions.
    pub fn set_turn(&mut self, side: Color) {
        self.turn = side;
    }

    /// The winner of the game, or `None` if the game is still going.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn game_result(&self) -> Option<GameResult> {
        self.winner.map(|winner| match winner {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        })
    }

    /// Whether the game was won because a position was repeated
    pub fn repeated_position(&self) -> bool {
        self.repeated
    }

    /// Number of moves played since the position was last reset, that have not been undone
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// Location of the king, or `None` if the king has been captured.
    pub fn king_position(&self) -> Option<Square> {
        self.king_position
    }

    pub fn get(&self, square: Square) -> Piece {
        self[square]
    }

    /// Squares occupied by `side`. The king is a white piece.
    pub fn piece_locations(&self, side: Color) -> BitBoard {
        match side {
            Color::White => self.white_squares,
            Color::Black => self.black_squares,
        }
    }

    /// Total number of pieces on the board, including the king
    pub fn piece_count(&self) -> u8 {
        (self.white_squares | self.black_squares).count()
    }

    /// The side to move, followed by the contents of every square in index order.
    pub fn encoded_board(&self) -> String {
        let mut encoded = String::with_capacity(NUM_SQUARES + 1);
        encoded.push(match self.turn {
            Color::White => 'W',
            Color::Black => 'B',
        });
        encoded.extend(self.cells.iter().map(|piece| piece.symbol()));
        encoded
    }

    /// Writes `piece` to `square`, without recording the change for undo.
    pub fn put(&mut self, piece: Piece, square: Square) {
        let old_piece = self[square];
        self.hash ^= zobrist_piece(square, old_piece) ^ zobrist_piece(square, piece);
        self.cells[square.index()] = piece;

        let i = square.into_inner();
        self.white_squares = self.white_squares.clear(i);
        self.black_squares = self.black_squares.clear(i);
        match piece.side() {
            Piece::White => self.white_squares = self.white_squares.set(i),
            Piece::Black => self.black_squares = self.black_squares.set(i),
            _ => (),
        }

        if piece == Piece::King {
            self.king_position = Some(square);
        } else if self.king_position == Some(square) {
            self.king_position = None;
        }
    }

    /// Writes `piece` to `square`, and records the new position so that it can be undone.
    pub fn rev_put(&mut self, piece: Piece, square: Square) {
        self.put(piece, square);
        self.record();
    }

    /// Whether every square on the rook path from `from` to `to`, other than `from`, is empty.
    pub fn is_unblocked_move(&self, from: Square, to: Square) -> bool {
        Move::new(from, to).is_some_and(|mv| mv.path().all(|square| self[square].is_empty()))
    }

    /// Whether `from` holds a piece of the side to move
    pub fn is_legal_from(&self, from: Square) -> bool {
        self[from].color() == Some(self.turn)
    }

    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        self.winner.is_none()
            && self.is_legal_from(from)
            && self.is_unblocked_move(from, to)
            && (to != THRONE || self[from] == Piece::King)
    }

    pub fn is_legal_move(&self, mv: Move) -> bool {
        self.is_legal(mv.from(), mv.to())
    }

    /// Plays `mv`.
    ///
    /// # Panics
    ///
    /// Panics if the move is not legal. Use `try_make_move` for moves from untrusted sources.
    pub fn make_move(&mut self, mv: Move) {
        assert!(
            self.is_legal_move(mv),
            "Illegal move {} on board\n{:?}",
            mv,
            self
        );
        self.do_legal_move(mv);
    }

    /// Plays the move `from`-`to`. Panics if it is not a legal move.
    pub fn make_move_squares(&mut self, from: Square, to: Square) {
        let mv = Move::new(from, to)
            .unwrap_or_else(|| panic!("{}-{} is not a rook move", from, to));
        self.make_move(mv);
    }

    /// Plays `mv` if it is legal, otherwise leaves the board untouched.
    pub fn try_make_move(&mut self, mv: Move) -> Result<(), TablutError> {
        if !self.is_legal_move(mv) {
            return Err(TablutError::IllegalMove(mv));
        }
        self.do_legal_move(mv);
        Ok(())
    }

    fn do_legal_move(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mover = self.turn;

        self.put(self[from], to);
        self.put(Piece::Empty, from);
        // Repetitions are checked after the piece has moved, but before captures are resolved
        self.check_repeated();
        self.turn = !self.turn;
        self.move_count += 1;

        for square in self.captures_from(to) {
            self.capture(square);
        }
        self.record();

        if let Some(winner) = self.decide_winner(mover, to) {
            self.winner = Some(winner);
        }
        if let Some(winner) = self.winner {
            trace!("{} wins after {} by {}", winner, mv, mover);
        }
    }

    /// The winner after `mover` landed on `to`, not counting repetitions.
    fn decide_winner(&self, mover: Color, to: Square) -> Option<Color> {
        if self
            .move_limit
            .is_some_and(|limit| self.move_count / 2 >= limit)
        {
            Some(!mover)
        } else if self[to] == Piece::King && to.is_edge() {
            Some(Color::White)
        } else if self.king_position.is_none() {
            Some(Color::Black)
        } else if !self.has_move(self.turn) {
            Some(!self.turn)
        } else {
            None
        }
    }

    fn check_repeated(&mut self) {
        // The fingerprint only narrows the search, the arrangement itself must match
        if self.seen.contains_key(&self.hash)
            && self
                .history
                .iter()
                .any(|snapshot| snapshot.hash == self.hash && snapshot.cells == self.cells)
        {
            self.winner = Some(!self.turn);
            self.repeated = true;
        }
    }

    /// Squares whose pieces are captured by the piece that just landed on `to`
    fn captures_from(&self, to: Square) -> ArrayVec<Square, 4> {
        let side = self[to].side();
        Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let mid = to.rook_move(direction, 1)?;
                let far = to.rook_move(direction, 2)?;
                self.is_captured_between(side, mid, far).then_some(mid)
            })
            .collect()
    }

    /// Whether a piece of `side` that is on one side of `mid`, with `far` on the other, captures `mid`.
    fn is_captured_between(&self, side: Piece, mid: Square, far: Square) -> bool {
        let victim = self[mid];
        if Some(victim.side()) != side.opponent() {
            return false;
        }
        match victim {
            Piece::King if mid == THRONE || SURROUNDING_THRONE.contains(&mid) => {
                self.surround_count(side, mid) > 3
            }
            _ => self.is_allied(side, far),
        }
    }

    /// Number of squares orthogonally adjacent to `square` that are allied to `side`
    pub fn surround_count(&self, side: Piece, square: Square) -> usize {
        square
            .neighbours()
            .filter(|neighbour| self.is_allied(side, *neighbour))
            .count()
    }

    /// Whether `square` acts as a piece of `side` for captures.
    /// The empty throne is hostile to both sides, and the occupied throne is hostile
    /// to white once three of the squares around it hold black pieces.
    pub fn is_allied(&self, side: Piece, square: Square) -> bool {
        let side = side.side();
        if side == Piece::Empty {
            false
        } else if self[square].side() == side {
            true
        } else if square == THRONE && self[THRONE].is_empty() {
            true
        } else if side == Piece::Black && square == THRONE {
            SURROUNDING_THRONE
                .iter()
                .filter(|surrounding| self[**surrounding] == Piece::Black)
                .count()
                >= 3
        } else {
            false
        }
    }

    fn capture(&mut self, square: Square) {
        self.put(Piece::Empty, square);
    }

    /// Takes back the last move. Has no effect if no moves have been played since the last reset.
    pub fn undo(&mut self) {
        if self.move_count == 0 {
            return;
        }
        if let Some(snapshot) = self.history.pop() {
            self.forget(snapshot.hash);
        }
        if let Some(snapshot) = self.history.last().cloned() {
            self.restore(&snapshot);
        }
        self.move_count -= 1;
        self.turn = !self.turn;
        self.repeated = false;
        self.winner = None;
    }

    /// Forgets all previous positions, making the current position the start of the history.
    /// Does not change the position or the winner.
    pub fn clear_undo(&mut self) {
        let snapshot = self.snapshot();
        self.history.clear();
        self.seen.clear();
        self.seen.insert(snapshot.hash, 1);
        self.history.push(snapshot);
        self.move_count = 0;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.cells,
            king_position: self.king_position,
            hash: self.hash,
        }
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        *self.seen.entry(snapshot.hash).or_insert(0) += 1;
        self.history.push(snapshot);
    }

    /// Records the current arrangement under a different fingerprint, as if two arrangements had
    /// the same zobrist hash.
    #[cfg(test)]
    pub(crate) fn record_with_fingerprint(&mut self, hash: u64) {
        let snapshot = Snapshot {
            hash,
            ..self.snapshot()
        };
        *self.seen.entry(hash).or_insert(0) += 1;
        self.history.push(snapshot);
    }

    #[cfg(test)]
    pub(crate) fn fingerprint(&self) -> u64 {
        self.hash
    }

    fn forget(&mut self, hash: u64) {
        if let Some(count) = self.seen.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.seen.remove(&hash);
            }
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.cells = snapshot.cells;
        self.king_position = snapshot.king_position;
        self.hash = snapshot.hash;
        self.white_squares = squares_iterator()
            .filter(|square| self[*square].side() == Piece::White)
            .collect();
        self.black_squares = squares_iterator()
            .filter(|square| self[*square].side() == Piece::Black)
            .collect();
    }

    /// All moves for `side`, regardless of whose turn it is.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        let mut moves = vec![];
        self.generate_moves_for(side, &mut moves);
        moves
    }

    /// Adds all moves for `side` to `moves`. The king's moves come first, then the moves of
    /// the other pieces by square index. Each piece's moves are ordered by direction, then distance.
    pub fn generate_moves_for(&self, side: Color, moves: &mut Vec<Move>) {
        if side == Color::White {
            if let Some(king) = self.king_position {
                for direction in Direction::ALL {
                    for &to in king.rook_ray(direction) {
                        if !self[to].is_empty() {
                            break;
                        }
                        moves.push(Move::new_unchecked(king, to));
                    }
                }
            }
        }
        for from in self.piece_locations(side) {
            if self[from] == Piece::King {
                continue;
            }
            for direction in Direction::ALL {
                for &to in from.rook_ray(direction) {
                    if !self[to].is_empty() || to == THRONE {
                        break;
                    }
                    moves.push(Move::new_unchecked(from, to));
                }
            }
        }
    }

    /// Whether `side` has at least one move, regardless of whose turn it is.
    pub fn has_move(&self, side: Color) -> bool {
        self.piece_locations(side).into_iter().any(|from| {
            let is_king = self[from] == Piece::King;
            from.neighbours()
                .any(|to| self[to].is_empty() && (is_king || to != THRONE))
        })
    }
}

impl PositionTrait for Board {
    type Move = Move;
    // Undo restores the previous snapshot, so nothing needs to be remembered
    type ReverseMove = ();
    type Settings = ();

    fn start_position() -> Self {
        Self::default()
    }

    fn start_position_with_settings(_settings: &Self::Settings) -> Self {
        Self::default()
    }

    fn side_to_move(&self) -> Color {
        self.turn
    }

    /// Adds all legal moves for the side to move. A finished game has no legal moves.
    fn generate_moves<E: Extend<Self::Move>>(&self, moves: &mut E) {
        if self.winner.is_none() {
            let mut generated = Vec::new();
            self.generate_moves_for(self.turn, &mut generated);
            moves.extend(generated);
        }
    }

    fn do_move(&mut self, mv: Self::Move) -> Self::ReverseMove {
        self.make_move(mv);
    }

    fn reverse_move(&mut self, _reverse_move: Self::ReverseMove) {
        self.undo();
    }

    fn game_result(&self) -> Option<GameResult> {
        Board::game_result(self)
    }
}
