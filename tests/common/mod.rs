#![allow(dead_code)]

use std::collections::VecDeque;

use chess_core::{ChessError, MoveOracle, StandardRules};
use chess_session::{Clock, ManualClock, Session, SessionConfig, ThinkTime};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move, Square};
use tempfile::TempDir;

/// Plays a fixed list of UCI moves, then fails.
pub struct ScriptedEngine {
    moves: VecDeque<String>,
}

impl ScriptedEngine {
    pub fn new(moves: &[&str]) -> Self {
        Self {
            moves: moves.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl MoveOracle for ScriptedEngine {
    fn best_move(&mut self, position: &Chess) -> Result<Move, ChessError> {
        let next = self
            .moves
            .pop_front()
            .ok_or_else(|| ChessError::Engine("script exhausted".into()))?;
        let uci: UciMove = next
            .parse()
            .map_err(|e| ChessError::Engine(format!("bad script move {next}: {e}")))?;
        uci.to_move(position)
            .map_err(|e| ChessError::Engine(format!("script move {next} illegal: {e}")))
    }
}

/// A session on a temp directory with a manual clock and seeded think delay.
pub struct TestSession {
    pub session: Session,
    pub clock: ManualClock,
    pub config: SessionConfig,
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> SessionConfig {
    SessionConfig {
        think_time: ThinkTime::new(2.0, 5.0).unwrap(),
        think_seed: Some(7),
        move_log_path: dir.path().join("move_history.json"),
        chat_log_path: dir.path().join("chat_history.json"),
        ..SessionConfig::default()
    }
}

pub fn session_with(engine: Box<dyn MoveOracle>) -> TestSession {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    session_with_config(engine, config, dir)
}

pub fn session_with_config(
    engine: Box<dyn MoveOracle>,
    config: SessionConfig,
    dir: TempDir,
) -> TestSession {
    let clock = ManualClock::new();
    let mut session = Session::new(
        &config,
        Box::new(StandardRules),
        engine,
        Box::new(clock.clone()),
    );
    session.start().unwrap();

    TestSession {
        session,
        clock,
        config,
        dir,
    }
}

pub fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

/// Click the origin and destination of a UCI move.
pub fn human_move(t: &mut TestSession, uci: &str) -> bool {
    t.session.select_square(sq(&uci[0..2]));
    t.session.choose_destination(sq(&uci[2..4])).unwrap()
}

/// Let the full think delay pass and tick once.
pub fn engine_turn(t: &mut TestSession) -> bool {
    t.clock.advance(t.config.think_time.max);
    t.session.tick(t.clock.now()).unwrap()
}
