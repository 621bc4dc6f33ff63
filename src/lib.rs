extern crate arrayvec;
extern crate board_game_traits;
extern crate pgn_traits;
extern crate rand;

pub mod board;
pub mod error;
pub mod minmax;
pub mod search;
mod tests;

pub use error::TablutError;
