//! Collaborator seams consumed by the turn controller.

use shakmaty::{Bitboard, Chess, KnownOutcome, Move, Position, Role, Square};

use crate::error::ChessError;
use crate::rules::Notation;

/// Answers legality, move application, notation and termination queries.
///
/// The controller never inspects a position on its own beyond piece
/// ownership; every rule decision goes through this trait.
pub trait RulesOracle {
    /// Squares reachable by a legal move starting on `from`.
    fn legal_destinations(&self, position: &Chess, from: Square) -> Bitboard;

    /// The legal move from `from` to `to`, if there is one.
    fn resolve_move(
        &self,
        position: &Chess,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Option<Move>;

    fn is_legal(&self, position: &Chess, mv: &Move) -> bool;

    /// Produce the position after `mv`. The input position is left untouched.
    fn apply_move(&self, position: &Chess, mv: &Move) -> Result<Chess, ChessError>;

    /// UCI and SAN for `mv`, relative to the position *before* the move.
    fn notation(&self, position: &Chess, mv: &Move) -> Notation;

    /// `Some` once the position alone decides the game. Repetition needs
    /// the game history and is left to the caller.
    fn outcome(&self, position: &Chess) -> Option<KnownOutcome>;

    fn fen(&self, position: &Chess) -> String;
}

/// Recommends one move for a position.
pub trait MoveOracle {
    fn best_move(&mut self, position: &Chess) -> Result<Move, ChessError>;
}

/// Plays the first move shakmaty generates. Deterministic, no engine needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMove;

impl MoveOracle for FirstLegalMove {
    fn best_move(&mut self, position: &Chess) -> Result<Move, ChessError> {
        position
            .legal_moves()
            .first()
            .cloned()
            .ok_or_else(|| ChessError::Engine("No legal moves in position".into()))
    }
}
