//! Stockfish engine wrapper using UCI protocol (blocking I/O)

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chess_core::{ChessError, MoveOracle, RulesOracle, StandardRules};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move};
use tracing::{debug, info, warn};

/// How long `quit` gets before the process is killed
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Search settings sent to the engine
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// UCI "Skill Level" option, 0..=20
    pub skill_level: u8,
    /// Search depth per move
    pub depth: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skill_level: 10,
            depth: 15,
        }
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    options: EngineOptions,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub fn new(path: &str, options: EngineOptions) -> Result<Self, ChessError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ChessError::Engine(format!("Failed to spawn Stockfish at {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ChessError::Engine("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ChessError::Engine("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            options,
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;

        let skill = options.skill_level.min(20);
        engine.send(&format!("setoption name Skill Level value {skill}"))?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;

        info!(path, skill, depth = options.depth, "Stockfish ready");
        Ok(engine)
    }

    /// Send a command to Stockfish
    fn send(&mut self, cmd: &str) -> Result<(), ChessError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .map_err(|e| ChessError::Engine(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .map_err(|e| ChessError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; end of stream means the process died
    fn read_line(&mut self, line: &mut String) -> Result<(), ChessError> {
        line.clear();
        let read = self
            .stdout
            .read_line(line)
            .map_err(|e| ChessError::Engine(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(ChessError::Engine("Stockfish closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    fn wait_for(&mut self, expected: &str) -> Result<(), ChessError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line)?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search a position and return the raw `bestmove` token
    pub fn search(&mut self, fen: &str) -> Result<String, ChessError> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {}", self.options.depth))?;

        let mut line = String::new();
        loop {
            self.read_line(&mut line)?;
            if let Some(best) = parse_bestmove(line.trim()) {
                return best
                    .map(String::from)
                    .ok_or_else(|| ChessError::Engine("Stockfish found no move".into()));
            }
        }
    }
}

impl MoveOracle for StockfishEngine {
    fn best_move(&mut self, position: &Chess) -> Result<Move, ChessError> {
        let fen = StandardRules.fen(position);
        let best = self.search(&fen)?;

        let uci: UciMove = best
            .parse()
            .map_err(|e| ChessError::Engine(format!("Unparseable bestmove '{best}': {e}")))?;
        uci.to_move(position)
            .map_err(|e| ChessError::Engine(format!("Illegal bestmove '{best}': {e}")))
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        if !shutdown(&mut self.process, QUIT_GRACE) {
            warn!("Stockfish ignored quit, killed");
        }
    }
}

/// Wait up to `grace` for `process` to exit, then kill it.
/// Returns whether it exited on its own.
fn shutdown(process: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        match process.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            _ => break,
        }
    }

    let _ = process.kill();
    let _ = process.wait();
    false
}

/// Parse a `bestmove` line. Outer `None`: not a bestmove line.
/// Inner `None`: the engine reported no move (`(none)`, mated or stalemated).
fn parse_bestmove(line: &str) -> Option<Option<&str>> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "bestmove" {
        return None;
    }
    match parts.next() {
        Some("(none)") | Some("0000") | None => Some(None),
        Some(mv) => Some(Some(mv)),
    }
}
