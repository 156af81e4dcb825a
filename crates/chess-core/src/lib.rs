//! Chess rules and move-selection seams used by the session crate.
//!
//! `RulesOracle` and `MoveOracle` are the two collaborators the turn
//! controller consults. `StandardRules` answers rule queries with shakmaty.

pub mod error;
pub mod game_data;
pub mod oracle;
pub mod pgn;
pub mod rules;

pub use error::ChessError;
pub use oracle::{FirstLegalMove, MoveOracle, RulesOracle};
pub use rules::{Notation, StandardRules};
