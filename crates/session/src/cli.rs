//! Terminal front end: line commands in, ASCII board out.

use std::fmt::Write;
use std::time::Instant;

use shakmaty::{File, Position, Rank, Square};

use crate::controller::{TurnController, TurnState};

pub const HELP: &str = "\
Commands:
  <square>     e.g. e2: select a piece, then a highlighted square to move
  say <text>   send a chat message
  board        redraw the board
  moves        show the move list
  chat         show the chat history
  pgn          print the game as PGN
  help         show this help
  quit         end the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Square(Square),
    Say(String),
    Board,
    Moves,
    Chat,
    Pgn,
    Help,
    Quit,
}

impl Command {
    /// `None` for blank or unrecognised input.
    pub fn parse(line: &str) -> Option<Command> {
        let trimmed = line.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (trimmed, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => None,
            "say" | "/say" => Some(Command::Say(rest.to_string())),
            "board" => Some(Command::Board),
            "moves" => Some(Command::Moves),
            "chat" => Some(Command::Chat),
            "pgn" => Some(Command::Pgn),
            "help" | "?" => Some(Command::Help),
            "quit" | "exit" => Some(Command::Quit),
            square if rest.is_empty() => square.parse::<Square>().ok().map(Command::Square),
            _ => None,
        }
    }
}

/// Cap chat input at `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Board from White's side. The selected piece is bracketed, reachable
/// squares are starred.
pub fn render_board(controller: &TurnController, now: Instant) -> String {
    let board = controller.position().board();
    let selection = controller.selection();
    let mut out = String::new();

    for rank in (0..8u32).rev() {
        let _ = write!(out, "{} ", rank + 1);
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let symbol = board.piece_at(square).map(|p| p.char()).unwrap_or('.');

            let is_origin = selection.is_some_and(|s| s.origin == square);
            let is_target = selection.is_some_and(|s| s.destinations.contains(square));

            let cell = if is_origin {
                format!("[{symbol}]")
            } else if is_target {
                let mark = if symbol == '.' { '*' } else { symbol };
                format!("*{mark}*")
            } else {
                format!(" {symbol} ")
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out.push_str("   a  b  c  d  e  f  g  h\n");

    let _ = write!(out, "{}", controller.status());
    if controller.state() == TurnState::AutomatedThinking {
        if let Some(left) = controller.think_remaining(now) {
            let _ = write!(out, " [{:.1}s]", left.as_secs_f64());
        }
    }
    out.push('\n');

    out
}
