//! Session configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chess_engine::EngineOptions;
use rand::Rng;

use crate::error::SessionError;

/// Which move oracle drives the automated side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    Stockfish,
    FirstLegal,
}

impl FromStr for EngineKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stockfish" => Ok(EngineKind::Stockfish),
            "first-legal" | "first_legal" => Ok(EngineKind::FirstLegal),
            _ => Err(SessionError::Config("ENGINE must be 'stockfish' or 'first-legal'")),
        }
    }
}

/// Longest accepted think delay; deadlines are `Instant` offsets.
const MAX_THINK: Duration = Duration::from_secs(3600);

/// Bounds of the automated side's artificial thinking pause
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThinkTime {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkTime {
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self, SessionError> {
        if !min_secs.is_finite() || !max_secs.is_finite() || min_secs < 0.0 {
            return Err(SessionError::Config(
                "think times must be finite and non-negative",
            ));
        }
        if max_secs < min_secs {
            return Err(SessionError::Config(
                "THINK_MAX_SECS must not be less than THINK_MIN_SECS",
            ));
        }

        let to_duration = |secs: f64| {
            Duration::try_from_secs_f64(secs)
                .ok()
                .filter(|d| *d <= MAX_THINK)
                .ok_or(SessionError::Config("think times must not exceed one hour"))
        };

        Ok(Self {
            min: to_duration(min_secs)?,
            max: to_duration(max_secs)?,
        })
    }

    /// A fixed pause, mostly useful in tests
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Draw one delay uniformly from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Move oracle for the automated side
    pub engine: EngineKind,

    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Skill level and search depth for Stockfish
    pub engine_options: EngineOptions,

    pub think_time: ThinkTime,

    /// Seed for the think-delay RNG; entropy when unset
    pub think_seed: Option<u64>,

    pub move_log_path: PathBuf,
    pub chat_log_path: PathBuf,

    /// Control loop polls per second
    pub tick_hz: u32,

    /// Input cap applied by the front end before chat reaches the core
    pub chat_max_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Stockfish,
            stockfish_path: "/usr/local/bin/stockfish".to_string(),
            engine_options: EngineOptions::default(),
            think_time: ThinkTime {
                min: Duration::from_secs(2),
                max: Duration::from_secs(5),
            },
            think_seed: None,
            move_log_path: PathBuf::from("move_history.json"),
            chat_log_path: PathBuf::from("chat_history.json"),
            tick_hz: 60,
            chat_max_chars: 50,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, SessionError> {
        let defaults = Self::default();

        let engine = match env::var("ENGINE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.engine,
        };

        let stockfish_path = env::var("STOCKFISH_PATH").unwrap_or(defaults.stockfish_path);

        let skill_level = env::var("STOCKFISH_SKILL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.engine_options.skill_level);

        let depth = env::var("STOCKFISH_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.engine_options.depth);

        let think_min = env::var("THINK_MIN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.think_time.min.as_secs_f64());

        let think_max = env::var("THINK_MAX_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.think_time.max.as_secs_f64());

        let think_seed = env::var("THINK_SEED").ok().and_then(|v| v.parse().ok());

        let move_log_path = env::var("MOVE_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.move_log_path);

        let chat_log_path = env::var("CHAT_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.chat_log_path);

        let tick_hz = env::var("TICK_HZ")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|hz| *hz > 0)
            .unwrap_or(defaults.tick_hz);

        let chat_max_chars = env::var("CHAT_MAX_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.chat_max_chars);

        if move_log_path == chat_log_path {
            return Err(SessionError::Config(
                "MOVE_LOG_PATH and CHAT_LOG_PATH must differ",
            ));
        }

        Ok(Self {
            engine,
            stockfish_path,
            engine_options: EngineOptions { skill_level, depth },
            think_time: ThinkTime::new(think_min, think_max)?,
            think_seed,
            move_log_path,
            chat_log_path,
            tick_hz,
            chat_max_chars,
        })
    }

    /// Interval between control loop polls
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }
}
