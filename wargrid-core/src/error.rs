//! Error types for the core crate

use thiserror::Error;

use crate::board::Pos;
use crate::game::Player;
use crate::moves::Move;

/// Recoverable conditions raised at the core's boundaries
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot parse move '{input}' (expected e.g. 'b2 b3')")]
    InvalidNotation { input: String },

    #[error("illegal move {mv} for {player}")]
    IllegalMove { mv: Move, player: Player },

    #[error("position {pos} is outside the {width}x{height} board")]
    OutOfBounds { pos: Pos, width: usize, height: usize },

    #[error("invalid level '{name}': {message}")]
    InvalidLevel { name: String, message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("game already over: {winner} has won")]
    GameOver { winner: Player },

    #[error("game abandoned by {player}")]
    Abandoned { player: Player },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
