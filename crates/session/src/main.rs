//! Terminal chess session against an engine.
//!
//! One cooperative loop polls stdin and a fixed-rate ticker. The engine's
//! think delay is checked on every tick, so chat input stays responsive
//! while the engine "thinks".

use std::time::Instant;

use anyhow::Context;
use chess_core::{FirstLegalMove, MoveOracle, StandardRules};
use chess_engine::StockfishEngine;
use chess_session::cli::{self, Command, HELP};
use chess_session::{EngineKind, Session, SessionConfig, SessionError, Side, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env()?;
    info!(engine = ?config.engine, think = ?config.think_time, "Config loaded");

    let engine: Box<dyn MoveOracle> = match config.engine {
        EngineKind::Stockfish => Box::new(
            StockfishEngine::new(&config.stockfish_path, config.engine_options)
                .context("Failed to start Stockfish (set ENGINE=first-legal to play without it)")?,
        ),
        EngineKind::FirstLegal => Box::new(FirstLegalMove),
    };

    let mut session = Session::new(
        &config,
        Box::new(StandardRules),
        engine,
        Box::new(SystemClock),
    );
    session.start()?;

    println!("{HELP}\n");
    print!("{}", cli::render_board(session.controller(), Instant::now()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result = run(&mut session, &config, &mut lines, &mut ticker).await;

    if let Err(e) = session.end() {
        warn!(error = %e, "Failed to remove session logs");
    }
    result
}

async fn run(
    session: &mut Session,
    config: &SessionConfig,
    lines: &mut Lines<BufReader<Stdin>>,
    ticker: &mut Interval,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => handle_command(session, config, command)?,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command. Type 'help'."),
                }
            }
            _ = ticker.tick() => {
                match session.tick(Instant::now()) {
                    Ok(false) => {}
                    Ok(true) => print!("{}", cli::render_board(session.controller(), Instant::now())),
                    Err(e) if e.is_fatal() => {
                        println!("{}", session.controller().status());
                        return Err(e.into());
                    }
                    Err(_) => print!("{}", cli::render_board(session.controller(), Instant::now())),
                }
            }
        }
    }

    Ok(())
}

fn handle_command(
    session: &mut Session,
    config: &SessionConfig,
    command: Command,
) -> Result<(), SessionError> {
    match command {
        Command::Square(square) => {
            let is_destination = session
                .controller()
                .selection()
                .is_some_and(|s| s.destinations.contains(square));

            let outcome = if is_destination {
                session.choose_destination(square).map(|_| ())
            } else {
                session.select_square(square);
                Ok(())
            };

            match outcome {
                Err(e) if e.is_fatal() => return Err(e),
                // The move stands; the status line carries the warning
                Ok(()) | Err(_) => {
                    print!("{}", cli::render_board(session.controller(), Instant::now()))
                }
            }
        }
        Command::Say(text) => {
            let text = cli::truncate_chars(&text, config.chat_max_chars);
            match session.submit(Side::Human, text) {
                Ok(true) => {
                    if let Some(last) = session.chat().recent(1).first() {
                        println!("{}", last.formatted());
                    }
                }
                Ok(false) => println!("Nothing to send."),
                Err(e) => println!("Warning: {e}"),
            }
        }
        Command::Board => print!("{}", cli::render_board(session.controller(), Instant::now())),
        Command::Moves => {
            let movetext = session.movetext();
            if movetext.is_empty() {
                println!("No moves yet.");
            } else {
                println!("{movetext}");
            }
        }
        Command::Chat => {
            let history = session.chat().formatted_history();
            if history.is_empty() {
                println!("No messages yet.");
            } else {
                println!("{history}");
            }
        }
        Command::Pgn => print!("{}", session.pgn()),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }

    Ok(())
}
