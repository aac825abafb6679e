//! Error types for chess-game-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("move is not legal in this position")]
    IllegalMove,

    #[error("it is not this player's turn")]
    WrongTurn,

    #[error("game is already over")]
    GameAlreadyOver,

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("FEN parsing error: {0}")]
    Fen(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
