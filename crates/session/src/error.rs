//! Session error types

use std::path::PathBuf;

use thiserror::Error;

use chess_core::ChessError;

/// A log could not be written to (or removed from) durable storage.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode log: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    /// A move reached application without passing the legality gate.
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// The move oracle failed to produce a legal move. Fatal for the session.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Recoverable: in-memory state stays authoritative.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SessionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Engine(_) | SessionError::IllegalMove(_))
    }
}

impl From<ChessError> for SessionError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::IllegalMove(msg) => SessionError::IllegalMove(msg),
            ChessError::Engine(msg) => SessionError::Engine(msg),
            other => SessionError::Engine(other.to_string()),
        }
    }
}
