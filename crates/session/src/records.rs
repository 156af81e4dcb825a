//! Records written to the move and chat logs.

use std::fmt;

use chrono::{DateTime, Utc};
use chess_core::Notation;
use serde::{Deserialize, Serialize};

use crate::history::LogRecord;

/// Who is acting: the person at the board or the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Human,
    Automated,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Human => Side::Automated,
            Side::Automated => Side::Human,
        }
    }

    /// Short label for chat and board output
    pub fn label(self) -> &'static str {
        match self {
            Side::Human => "You",
            Side::Automated => "Engine",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Human => f.write_str("human"),
            Side::Automated => f.write_str("automated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based, assigned by the log on append
    pub move_number: u32,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    /// UCI notation, e.g. "e2e4"
    pub uci: String,
    /// SAN notation, e.g. "e4"
    pub san: String,
    /// Position after the move
    pub fen: String,
}

impl MoveRecord {
    pub fn new(side: Side, notation: Notation, fen: String) -> Self {
        Self {
            move_number: 0,
            timestamp: Utc::now(),
            side,
            uci: notation.uci,
            san: notation.san,
            fen,
        }
    }
}

impl LogRecord for MoveRecord {
    fn assign_sequence(&mut self, sequence: u32) {
        self.move_number = sequence;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub timestamp: DateTime<Utc>,
    pub sender: Side,
    pub text: String,
}

impl ChatRecord {
    pub fn new(sender: Side, text: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            sender,
            text: text.to_string(),
        }
    }

    /// "[2026-10-16 14:03:22] You: hello"
    pub fn formatted(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.sender.label(),
            self.text
        )
    }
}

impl LogRecord for ChatRecord {}
