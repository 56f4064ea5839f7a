//! Run configuration.
//!
//! Layers, later ones winning: defaults, an optional JSON file, the
//! `WORDHULL_WORKERS` / `WORDHULL_SEED` environment variables, then
//! command-line flags.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wordhull_engine::{EvaluationSettings, RunMode, DEFAULT_EPSILON};
use wordhull_words::Alphabet;

pub const WORKERS_ENV: &str = "WORDHULL_WORKERS";
pub const SEED_ENV: &str = "WORDHULL_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub alphabet: Vec<String>,
    pub min_length: usize,
    /// Exclusive.
    pub max_length: usize,
    pub gate_visibility: f64,
    pub mode: RunMode,
    pub targets: usize,
    pub seed: Option<u64>,
    /// Worker threads; `None` uses one per core.
    pub workers: Option<usize>,
    pub max_points_states: usize,
    pub max_points_channels: usize,
    pub epsilon: f64,
    pub output: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            alphabet: ["H", "T", "R", "X", "Y", "Z", "I"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_length: 1,
            max_length: 4,
            gate_visibility: 0.99,
            mode: RunMode::States,
            targets: 1,
            seed: None,
            workers: None,
            max_points_states: 100,
            max_points_channels: 200,
            epsilon: DEFAULT_EPSILON,
            output: None,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults, or the given file, with the environment applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(WORKERS_ENV) {
            let workers = raw
                .trim()
                .parse()
                .with_context(|| format!("{WORKERS_ENV}={raw} is not a worker count"))?;
            self.workers = Some(workers);
        }
        if let Some(raw) = lookup(SEED_ENV) {
            let seed = raw
                .trim()
                .parse()
                .with_context(|| format!("{SEED_ENV}={raw} is not a seed"))?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.alphabet.is_empty(), "alphabet is empty");
        ensure!(self.min_length >= 1, "min_length must be at least 1");
        ensure!(
            self.max_length > self.min_length,
            "max_length ({}) must exceed min_length ({})",
            self.max_length,
            self.min_length
        );
        if self.mode != RunMode::Visibility {
            ensure!(self.targets > 0, "at least one target is required");
        }
        if !(self.gate_visibility > 0.0 && self.gate_visibility <= 1.0) {
            bail!("gate visibility {} is outside (0, 1]", self.gate_visibility);
        }
        ensure!(
            self.epsilon.is_finite() && self.epsilon >= 0.0,
            "merge epsilon must be a non-negative number"
        );
        if let Some(workers) = self.workers {
            ensure!(workers > 0, "worker count must be positive");
        }
        Ok(())
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        Ok(Alphabet::new(self.alphabet.iter().cloned())?)
    }

    pub fn evaluation_settings(&self) -> EvaluationSettings {
        let max_points = match self.mode {
            RunMode::Channels => self.max_points_channels,
            RunMode::States | RunMode::Visibility => self.max_points_states,
        };
        EvaluationSettings {
            max_points,
            epsilon: self.epsilon,
        }
    }
}
