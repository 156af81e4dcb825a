//! Turn coordination state machine.
//!
//! The human plays White and drives the board with square selections. After
//! each human move the controller schedules the automated reply behind a
//! randomized think delay; `tick` applies it once the deadline passes. The
//! delay is a deadline checked on every poll, never a blocking sleep.
//!
//! States:
//! - `AwaitingHumanSelection`: nothing selected, human to move
//! - `AwaitingHumanDestination`: an origin with legal destinations is selected
//! - `AutomatedThinking`: engine reply scheduled for `deadline`
//! - `GameOver`: terminal, every input is ignored

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chess_core::{ChessError, MoveOracle, RulesOracle};
use rand::rngs::StdRng;
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, KnownOutcome, Move, Position, Rank, Role, Square,
};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::ThinkTime;
use crate::error::SessionError;
use crate::history::HistoryLog;
use crate::records::{MoveRecord, Side};

const HUMAN_COLOR: Color = Color::White;

/// Occurrences of one position that end the game as a draw.
const FIVEFOLD_REPETITION: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingHumanSelection,
    AwaitingHumanDestination,
    AutomatedThinking,
    GameOver,
}

/// The selected origin square and where it may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub origin: Square,
    pub destinations: Bitboard,
}

pub struct TurnController {
    rules: Box<dyn RulesOracle>,
    engine: Box<dyn MoveOracle>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    think_time: ThinkTime,

    position: Chess,
    turn: Side,
    state: TurnState,
    selection: Option<Selection>,
    deadline: Option<Instant>,
    outcome: Option<KnownOutcome>,
    engine_fault: Option<String>,
    status: String,
    /// Times each position has occurred, keyed by its FEN without clocks.
    repetitions: HashMap<String, u32>,

    moves: HistoryLog<MoveRecord>,
}

impl TurnController {
    pub fn new(
        rules: Box<dyn RulesOracle>,
        engine: Box<dyn MoveOracle>,
        clock: Box<dyn Clock>,
        rng: StdRng,
        think_time: ThinkTime,
        moves: HistoryLog<MoveRecord>,
    ) -> Self {
        let position = Chess::default();
        let repetitions = HashMap::from([(repetition_key(&rules.fen(&position)), 1)]);

        Self {
            rules,
            engine,
            clock,
            rng,
            think_time,
            position,
            turn: Side::Human,
            state: TurnState::AwaitingHumanSelection,
            selection: None,
            deadline: None,
            outcome: None,
            engine_fault: None,
            status: ready_status(),
            repetitions,
            moves,
        }
    }

    /// Back to the initial position with an empty move log.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.position = Chess::default();
        self.turn = Side::Human;
        self.state = TurnState::AwaitingHumanSelection;
        self.selection = None;
        self.deadline = None;
        self.outcome = None;
        self.engine_fault = None;
        self.status = ready_status();
        self.repetitions.clear();
        self.repetitions
            .insert(repetition_key(&self.rules.fen(&self.position)), 1);

        self.moves.reset()?;
        Ok(())
    }

    /// Remove the move log's backing file.
    pub fn dispose_log(&mut self) -> Result<(), SessionError> {
        self.moves.dispose()?;
        Ok(())
    }

    // Read-only queries

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.rules.fen(&self.position)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == TurnState::GameOver
    }

    pub fn outcome(&self) -> Option<KnownOutcome> {
        self.outcome
    }

    /// Time left before the automated move, while one is scheduled.
    pub fn think_remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TurnState::AutomatedThinking => self.deadline.map(|d| d.saturating_duration_since(now)),
            _ => None,
        }
    }

    /// Message for the user-facing layer.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Set once the move oracle has failed; no further ticks are processed.
    pub fn engine_fault(&self) -> Option<&str> {
        self.engine_fault.as_deref()
    }

    pub fn moves(&self) -> &HistoryLog<MoveRecord> {
        &self.moves
    }

    // Mutation surface

    /// Select `square` as the origin of the human's next move.
    pub fn select_square(&mut self, square: Square) {
        if !matches!(
            self.state,
            TurnState::AwaitingHumanSelection | TurnState::AwaitingHumanDestination
        ) {
            return;
        }

        let owns_piece = self
            .position
            .board()
            .piece_at(square)
            .is_some_and(|piece| piece.color == HUMAN_COLOR);

        let destinations = if owns_piece {
            self.rules.legal_destinations(&self.position, square)
        } else {
            Bitboard::EMPTY
        };

        if destinations.is_empty() {
            self.selection = None;
            self.state = TurnState::AwaitingHumanSelection;
            if owns_piece {
                self.status = format!("{square} has no legal moves");
            }
            debug!(%square, owns_piece, "Selection cleared");
            return;
        }

        self.selection = Some(Selection {
            origin: square,
            destinations,
        });
        self.state = TurnState::AwaitingHumanDestination;
        self.status = format!("Selected {square}");
        debug!(%square, count = destinations.count(), "Square selected");
    }

    /// Move the selected piece to `dest`.
    ///
    /// Returns `Ok(false)` without touching any state when there is no
    /// selection or `dest` is not one of its destinations. A
    /// [`SessionError::Persistence`] means the move *was* applied but could
    /// not be logged.
    pub fn choose_destination(&mut self, dest: Square) -> Result<bool, SessionError> {
        if self.state != TurnState::AwaitingHumanDestination {
            return Ok(false);
        }
        let Some(selection) = self.selection else {
            return Ok(false);
        };
        if !selection.destinations.contains(dest) {
            return Ok(false);
        }

        let origin = selection.origin;
        // Promotion always resolves to a queen; there is no piece choice.
        let promotion = self
            .position
            .board()
            .piece_at(origin)
            .filter(|piece| piece.role == Role::Pawn)
            .filter(|_| matches!(dest.rank(), Rank::First | Rank::Eighth))
            .map(|_| Role::Queen);

        let Some(mv) = self
            .rules
            .resolve_move(&self.position, origin, dest, promotion)
        else {
            self.status = format!("Illegal move {origin}{dest}");
            return Err(SessionError::IllegalMove(format!("{origin}{dest}")));
        };

        self.apply_move(&mv, Side::Human)?;
        Ok(true)
    }

    /// Play the automated move once `now` reaches the scheduled deadline.
    ///
    /// Returns `Ok(true)` when a move was applied. A
    /// [`SessionError::Engine`] is fatal: the fault is recorded and later
    /// ticks do nothing.
    pub fn tick(&mut self, now: Instant) -> Result<bool, SessionError> {
        if self.state != TurnState::AutomatedThinking || self.engine_fault.is_some() {
            return Ok(false);
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Ok(false),
        }

        let mv = match self.engine.best_move(&self.position) {
            Ok(mv) if self.rules.is_legal(&self.position, &mv) => mv,
            Ok(mv) => {
                let uci = mv.to_uci(CastlingMode::Standard);
                return Err(self.fault(format!("engine chose illegal move {uci}")));
            }
            Err(ChessError::Engine(message)) => return Err(self.fault(message)),
            Err(e) => return Err(self.fault(e.to_string())),
        };

        self.apply_move(&mv, Side::Automated)?;
        Ok(true)
    }

    fn fault(&mut self, message: String) -> SessionError {
        error!(error = %message, "Move oracle failed");
        self.deadline = None;
        self.status = format!("Engine failure: {message}");
        self.engine_fault = Some(message.clone());
        SessionError::Engine(message)
    }

    /// Shared by both sides: notation, next position, log, outcome, next state.
    fn apply_move(&mut self, mv: &Move, side: Side) -> Result<(), SessionError> {
        // Notation is relative to the position before the move
        let notation = self.rules.notation(&self.position, mv);
        let next = match self.rules.apply_move(&self.position, mv) {
            Ok(next) => next,
            Err(e) => {
                error!(error = %e, uci = %notation.uci, "Move rejected by rules");
                self.status = format!("Illegal move {}", notation.uci);
                return Err(e.into());
            }
        };

        self.position = next;
        self.selection = None;
        self.deadline = None;
        self.turn = self.turn.opponent();

        let fen = self.rules.fen(&self.position);
        let seen = self.repetitions.entry(repetition_key(&fen)).or_insert(0);
        *seen += 1;
        let repeated = *seen >= FIVEFOLD_REPETITION;
        info!(%side, uci = %notation.uci, san = %notation.san, "Move applied");

        self.status = match side {
            Side::Human => format!("You played {}", notation.san),
            Side::Automated => format!("Engine played {}", notation.san),
        };

        let record = MoveRecord::new(side, notation, fen);
        let logged = self.moves.append(record).map(|_| ());

        let outcome = self
            .rules
            .outcome(&self.position)
            .or(repeated.then_some(KnownOutcome::Draw));

        if let Some(outcome) = outcome {
            info!(result = %outcome, "Game over");
            self.state = TurnState::GameOver;
            self.status = format!("Game over: {outcome}");
            self.outcome = Some(outcome);
        } else if side == Side::Human {
            let delay = self.think_time.sample(&mut self.rng);
            self.deadline = Some(self.clock.now() + delay);
            self.state = TurnState::AutomatedThinking;
            self.status = format!("Engine is thinking ({:.1}s)", delay.as_secs_f64());
            debug!(delay_ms = delay.as_millis() as u64, "Automated move scheduled");
        } else {
            self.state = TurnState::AwaitingHumanSelection;
        }

        if let Err(e) = logged {
            warn!(error = %e, "Move applied but not saved");
            self.status = format!("{} (warning: move log not saved: {e})", self.status);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Placement, side to move, castling rights and en passant square.
fn repetition_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn ready_status() -> String {
    "You play White. Select a piece.".to_string()
}
