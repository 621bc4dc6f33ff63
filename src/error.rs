use std::{error, fmt};

use crate::board::Move;

/// Errors surfaced by the rules engine and the search.
#[derive(Debug)]
pub enum TablutError {
    /// A configuration change was rejected, such as a move limit that has already been passed.
    InvalidConfiguration(String),
    /// A move was attempted that is not legal in the current position.
    IllegalMove(Move),
    /// The search reached a finished game without a white or black winner.
    InvalidWinner,
    Parse(pgn_traits::Error),
}

impl fmt::Display for TablutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TablutError::InvalidConfiguration(message) => {
                write!(f, "Invalid configuration: {}", message)
            }
            TablutError::IllegalMove(mv) => write!(f, "Illegal move {}", mv),
            TablutError::InvalidWinner => write!(f, "Invalid winner"),
            TablutError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for TablutError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            TablutError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<pgn_traits::Error> for TablutError {
    fn from(err: pgn_traits::Error) -> Self {
        TablutError::Parse(err)
    }
}
