pub use chess_core;
pub use shakmaty;

pub mod chat;
pub mod cli;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod records;
pub mod session;

pub use chat::ChatChannel;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineKind, SessionConfig, ThinkTime};
pub use controller::{Selection, TurnController, TurnState};
pub use error::{PersistenceError, SessionError};
pub use history::{HistoryLog, LogRecord};
pub use records::{ChatRecord, MoveRecord, Side};
pub use session::Session;
