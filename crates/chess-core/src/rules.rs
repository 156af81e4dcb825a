//! Standard chess rules backed by shakmaty.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{
    Bitboard, CastlingMode, Chess, EnPassantMode, KnownOutcome, Move, Position, Role, Square,
};

use crate::error::ChessError;
use crate::oracle::RulesOracle;

/// Halfmove clock value at which the game is drawn automatically.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// A move rendered in both notations the move log stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    /// Compact machine notation, e.g. `e2e4`, `e7e8q`, `e1g1`
    pub uci: String,
    /// Standard algebraic notation with check suffix, e.g. `Nf3`, `Qxf7#`
    pub san: String,
}

/// `RulesOracle` for standard chess.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRules;

impl StandardRules {
    /// Parse a FEN string into a position.
    pub fn position_from_fen(fen: &str) -> Result<Chess, ChessError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| ChessError::Fen(format!("'{fen}': {e}")))?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| ChessError::Fen(format!("'{fen}': {e}")))
    }

    /// Replay SAN moves from the initial position.
    /// Fails on the first move that does not parse or is not legal.
    pub fn replay_san<S: AsRef<str>>(moves: &[S]) -> Result<Chess, ChessError> {
        let mut pos = Chess::default();

        for san_str in moves {
            let san_str = san_str.as_ref().trim();
            let san: San = san_str
                .parse()
                .map_err(|e| ChessError::Notation(format!("Invalid SAN '{san_str}': {e}")))?;
            let mv = san
                .to_move(&pos)
                .map_err(|e| ChessError::IllegalMove(format!("'{san_str}': {e}")))?;
            pos.play_unchecked(mv);
        }

        Ok(pos)
    }

    /// Replay UCI moves from the initial position.
    pub fn replay_uci<S: AsRef<str>>(moves: &[S]) -> Result<Chess, ChessError> {
        let mut pos = Chess::default();

        for uci_str in moves {
            let uci_str = uci_str.as_ref().trim();
            let uci: UciMove = uci_str
                .parse()
                .map_err(|e| ChessError::Notation(format!("Invalid UCI '{uci_str}': {e}")))?;
            let mv = uci
                .to_move(&pos)
                .map_err(|e| ChessError::IllegalMove(format!("'{uci_str}': {e}")))?;
            pos.play_unchecked(mv);
        }

        Ok(pos)
    }
}

impl RulesOracle for StandardRules {
    fn legal_destinations(&self, position: &Chess, from: Square) -> Bitboard {
        // Castling is reported as the king's destination, not the rook's square.
        position
            .legal_moves()
            .iter()
            .filter_map(|mv| match mv.to_uci(CastlingMode::Standard) {
                UciMove::Normal { from: origin, to, .. } if origin == from => Some(to),
                _ => None,
            })
            .collect()
    }

    fn resolve_move(
        &self,
        position: &Chess,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Option<Move> {
        let uci = UciMove::Normal {
            from,
            to,
            promotion,
        };
        uci.to_move(position).ok()
    }

    fn is_legal(&self, position: &Chess, mv: &Move) -> bool {
        position.legal_moves().contains(mv)
    }

    fn apply_move(&self, position: &Chess, mv: &Move) -> Result<Chess, ChessError> {
        if !self.is_legal(position, mv) {
            return Err(ChessError::IllegalMove(
                mv.to_uci(CastlingMode::Standard).to_string(),
            ));
        }

        let mut next = position.clone();
        next.play_unchecked(mv.clone());
        Ok(next)
    }

    fn notation(&self, position: &Chess, mv: &Move) -> Notation {
        let uci = mv.to_uci(CastlingMode::Standard).to_string();

        let mut scratch = position.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut scratch, mv.clone()).to_string();

        Notation { uci, san }
    }

    fn outcome(&self, position: &Chess) -> Option<KnownOutcome> {
        if let Some(outcome) = position.outcome().known() {
            return Some(outcome);
        }
        // Seventy-five-move rule: drawn without a claim unless the last move mated
        if position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(KnownOutcome::Draw);
        }
        None
    }

    fn fen(&self, position: &Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_legal_destinations_pawn_and_knight() {
        let pos = Chess::default();
        let pawn = StandardRules.legal_destinations(&pos, sq("e2"));
        assert_eq!(pawn.count(), 2);
        assert!(pawn.contains(sq("e3")));
        assert!(pawn.contains(sq("e4")));

        let knight = StandardRules.legal_destinations(&pos, sq("g1"));
        assert!(knight.contains(sq("f3")));
        assert!(knight.contains(sq("h3")));
        assert_eq!(knight.count(), 2);
    }

    #[test]
    fn test_legal_destinations_empty_for_blocked_piece() {
        let pos = Chess::default();
        assert!(StandardRules.legal_destinations(&pos, sq("a1")).is_empty());
        assert!(StandardRules.legal_destinations(&pos, sq("e5")).is_empty());
    }

    #[test]
    fn test_castling_destination_is_king_square() {
        let pos = StandardRules::position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .unwrap();
        let dests = StandardRules.legal_destinations(&pos, sq("e1"));
        assert!(dests.contains(sq("g1")));
        assert!(dests.contains(sq("c1")));

        let castle = StandardRules
            .resolve_move(&pos, sq("e1"), sq("g1"), None)
            .unwrap();
        assert_eq!(StandardRules.notation(&pos, &castle).san, "O-O");
        assert_eq!(StandardRules.notation(&pos, &castle).uci, "e1g1");
    }

    #[test]
    fn test_resolve_promotion_requires_role() {
        let pos = StandardRules::position_from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert!(StandardRules
            .resolve_move(&pos, sq("e7"), sq("e8"), None)
            .is_none());

        let promo = StandardRules
            .resolve_move(&pos, sq("e7"), sq("e8"), Some(Role::Queen))
            .unwrap();
        let notation = StandardRules.notation(&pos, &promo);
        assert_eq!(notation.uci, "e7e8q");
        assert_eq!(notation.san, "e8=Q");
    }

    #[test]
    fn test_notation_and_apply() {
        let pos = Chess::default();
        let mv = StandardRules
            .resolve_move(&pos, sq("g1"), sq("f3"), None)
            .unwrap();

        let notation = StandardRules.notation(&pos, &mv);
        assert_eq!(notation.uci, "g1f3");
        assert_eq!(notation.san, "Nf3");

        let next = StandardRules.apply_move(&pos, &mv).unwrap();
        assert_eq!(next.turn(), Color::Black);
        // Input position is untouched
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(
            StandardRules.fen(&next),
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
    }

    #[test]
    fn test_apply_illegal_move_fails() {
        let pos = StandardRules::replay_san(&["e4"]).unwrap();
        // e2e4 again is not legal for black
        let stale = StandardRules
            .resolve_move(&Chess::default(), sq("e2"), sq("e4"), None)
            .unwrap();
        assert!(!StandardRules.is_legal(&pos, &stale));
        let err = StandardRules.apply_move(&pos, &stale).unwrap_err();
        assert!(matches!(err, ChessError::IllegalMove(_)));
    }

    #[test]
    fn test_outcome_checkmate() {
        let pos = StandardRules::replay_san(&["f3", "e5", "g4"]).unwrap();
        assert!(StandardRules.outcome(&pos).is_none());

        let mate = StandardRules
            .resolve_move(&pos, sq("d8"), sq("h4"), None)
            .unwrap();
        assert_eq!(StandardRules.notation(&pos, &mate).san, "Qh4#");

        let end = StandardRules.apply_move(&pos, &mate).unwrap();
        let outcome = StandardRules.outcome(&end).unwrap();
        assert_eq!(outcome.to_string(), "0-1");
    }

    #[test]
    fn test_outcome_seventy_five_move_rule() {
        let pos = StandardRules::position_from_fen("7k/8/8/8/8/8/8/KR6 w - - 149 120").unwrap();
        assert!(StandardRules.outcome(&pos).is_none());

        let quiet = StandardRules
            .resolve_move(&pos, sq("b1"), sq("b2"), None)
            .unwrap();
        let end = StandardRules.apply_move(&pos, &quiet).unwrap();
        assert_eq!(end.halfmoves(), SEVENTY_FIVE_MOVE_PLIES);
        assert_eq!(StandardRules.outcome(&end), Some(KnownOutcome::Draw));
        assert_eq!(StandardRules.outcome(&end).unwrap().to_string(), "1/2-1/2");
    }

    #[test]
    fn test_mate_on_seventy_fifth_move_stands() {
        // Back-rank mate delivered by the move that reaches the limit
        let pos = StandardRules::position_from_fen("6k1/5ppp/8/8/8/8/8/KR6 w - - 149 120").unwrap();
        let mate = StandardRules
            .resolve_move(&pos, sq("b1"), sq("b8"), None)
            .unwrap();
        let end = StandardRules.apply_move(&pos, &mate).unwrap();
        assert_eq!(StandardRules.outcome(&end).unwrap().to_string(), "1-0");
    }

    #[test]
    fn test_replay_uci_matches_san() {
        let by_san = StandardRules::replay_san(&["e4", "e5", "Nf3", "Nc6"]).unwrap();
        let by_uci = StandardRules::replay_uci(&["e2e4", "e7e5", "g1f3", "b8c6"]).unwrap();
        assert_eq!(StandardRules.fen(&by_san), StandardRules.fen(&by_uci));
    }

    #[test]
    fn test_replay_rejects_illegal() {
        assert!(StandardRules::replay_san(&["e4", "e4"]).is_err());
        assert!(StandardRules::replay_uci(&["zz99"]).is_err());
    }
}
