//! Chess rule and engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChessError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid notation: {0}")]
    Notation(String),

    #[error("Invalid FEN: {0}")]
    Fen(String),

    #[error("Engine error: {0}")]
    Engine(String),
}
