//! Free-text chat running alongside the game.

use tracing::info;

use crate::error::SessionError;
use crate::history::HistoryLog;
use crate::records::{ChatRecord, Side};

pub struct ChatChannel {
    log: HistoryLog<ChatRecord>,
}

impl ChatChannel {
    pub fn new(log: HistoryLog<ChatRecord>) -> Self {
        Self { log }
    }

    /// Record a message. Blank messages are ignored and return `Ok(false)`.
    /// Length limits are the input layer's job.
    pub fn submit(&mut self, sender: Side, text: &str) -> Result<bool, SessionError> {
        if text.trim().is_empty() {
            return Ok(false);
        }

        self.log.append(ChatRecord::new(sender, text))?;
        info!(%sender, len = text.chars().count(), "Chat message recorded");
        Ok(true)
    }

    pub fn messages(&self) -> &[ChatRecord] {
        self.log.all()
    }

    pub fn recent(&self, n: usize) -> &[ChatRecord] {
        self.log.recent(n)
    }

    /// One line per message: "[timestamp] You: text"
    pub fn formatted_history(&self) -> String {
        self.log
            .all()
            .iter()
            .map(ChatRecord::formatted)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn log(&self) -> &HistoryLog<ChatRecord> {
        &self.log
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.log.reset()?;
        Ok(())
    }

    pub fn dispose(&mut self) -> Result<(), SessionError> {
        self.log.dispose()?;
        Ok(())
    }
}
