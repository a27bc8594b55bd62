//! Driver configuration: command line, optionally layered over a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use delooped_core::enums::GameMode;
use delooped_sim::SimConfig;

/// Headless runner for the DELOOPED simulation.
#[derive(Debug, Parser)]
#[command(name = "delooped", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file with an `AppConfig`; flags given here override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// RNG seed for the simulation and capsule rolls.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Game mode to play.
    #[arg(long, value_enum, ignore_case = true)]
    pub mode: Option<ModeArg>,
    /// Number of runs to play back to back.
    #[arg(long)]
    pub runs: Option<u32>,
    /// Simulated seconds after which a run is forfeited.
    #[arg(long, value_name = "SECONDS")]
    pub max_secs: Option<f64>,
    /// Pace ticks in real time on the game-loop thread.
    #[arg(long)]
    pub realtime: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
    /// Let runs play out without placing any buildings.
    #[arg(long)]
    pub no_autopilot: bool,
}

/// Command-line spelling of [`GameMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Standard,
    Boosted,
    Hardcore,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => GameMode::Standard,
            ModeArg::Boosted => GameMode::Boosted,
            ModeArg::Hardcore => GameMode::Hardcore,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Resolved driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub seed: u64,
    pub mode: GameMode,
    pub runs: u32,
    pub max_secs: f64,
    pub realtime: bool,
    pub verbose: bool,
    pub autopilot: bool,
    /// Passed through to the engine; `seed` above takes precedence.
    pub sim: SimConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            mode: GameMode::Standard,
            runs: 1,
            max_secs: 1_800.0,
            realtime: false,
            verbose: false,
            autopilot: true,
            sim: SimConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the config file named by `cli`, if any, and apply the flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.merge(cli)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer command-line flags over `self`.
    pub fn merge(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(mode) = cli.mode {
            self.mode = mode.into();
        }
        if let Some(runs) = cli.runs {
            self.runs = runs;
        }
        if let Some(max_secs) = cli.max_secs {
            self.max_secs = max_secs;
        }
        self.realtime |= cli.realtime;
        self.verbose |= cli.verbose;
        if cli.no_autopilot {
            self.autopilot = false;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_secs.is_finite() && self.max_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_secs must be positive, got {}",
                self.max_secs
            )));
        }
        if self.sim.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.sim.transition_chance) {
            return Err(ConfigError::Invalid(format!(
                "transition_chance must be within [0, 1], got {}",
                self.sim.transition_chance
            )));
        }
        Ok(())
    }

    /// Engine configuration with the driver seed applied.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            ..self.sim.clone()
        }
    }

    /// Ticks after which a run is forfeited.
    pub fn max_ticks(&self) -> u64 {
        (self.max_secs * self.sim.tick_rate as f64).ceil() as u64
    }
}
