//! One running game: the turn controller plus the chat channel, with an
//! explicit start/end lifecycle.
//!
//! Logs never outlive a session. `start` wipes both logs and their files;
//! `end` removes the files. Keeping history across sessions would need an
//! explicit change to this policy.

use std::time::Instant;

use chess_core::game_data::GameMetadata;
use chess_core::{pgn, MoveOracle, RulesOracle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shakmaty::Square;
use tracing::info;

use crate::chat::ChatChannel;
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::controller::TurnController;
use crate::error::SessionError;
use crate::history::HistoryLog;
use crate::records::Side;

pub struct Session {
    controller: TurnController,
    chat: ChatChannel,
}

impl Session {
    pub fn new(
        config: &SessionConfig,
        rules: Box<dyn RulesOracle>,
        engine: Box<dyn MoveOracle>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let rng = match config.think_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let controller = TurnController::new(
            rules,
            engine,
            clock,
            rng,
            config.think_time,
            HistoryLog::new(&config.move_log_path),
        );
        let chat = ChatChannel::new(HistoryLog::new(&config.chat_log_path));

        Self { controller, chat }
    }

    /// Fresh game: initial position, human to move, both logs empty.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let moves = self.controller.reset();
        let chat = self.chat.reset();
        moves.and(chat)?;

        info!(
            move_log = %self.controller.moves().path().display(),
            chat_log = %self.chat.log().path().display(),
            "Session started"
        );
        Ok(())
    }

    /// Remove both log files. The session can be started again afterwards.
    pub fn end(&mut self) -> Result<(), SessionError> {
        let moves = self.controller.dispose_log();
        let chat = self.chat.dispose();
        moves.and(chat)?;

        info!(moves = self.controller.moves().len(), "Session ended");
        Ok(())
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    pub fn chat(&self) -> &ChatChannel {
        &self.chat
    }

    pub fn select_square(&mut self, square: Square) {
        self.controller.select_square(square);
    }

    pub fn choose_destination(&mut self, dest: Square) -> Result<bool, SessionError> {
        self.controller.choose_destination(dest)
    }

    pub fn tick(&mut self, now: Instant) -> Result<bool, SessionError> {
        self.controller.tick(now)
    }

    pub fn submit(&mut self, sender: Side, text: &str) -> Result<bool, SessionError> {
        self.chat.submit(sender, text)
    }

    /// "1. e4 e5 2. Nf3 ..."
    pub fn movetext(&self) -> String {
        pgn::format_movetext(&self.sans())
    }

    /// The game so far as PGN, with the result once the game is over.
    pub fn pgn(&self) -> String {
        let result = self
            .controller
            .outcome()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "*".to_string());
        let metadata = GameMetadata::new("Human", "Engine").with_result(&result);
        pgn::write_pgn(&metadata, &self.sans())
    }

    fn sans(&self) -> Vec<&str> {
        self.controller
            .moves()
            .all()
            .iter()
            .map(|record| record.san.as_str())
            .collect()
    }
}
