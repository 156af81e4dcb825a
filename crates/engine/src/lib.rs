//! Move oracles backed by external engines.

pub mod stockfish;

pub use stockfish::{EngineOptions, StockfishEngine};
