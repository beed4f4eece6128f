//! Engine tuning parameters.
//!
//! Every field has a default, so a partial TOML/JSON document overrides only
//! what it names. `validate` rejects configurations that would make
//! generation or scoring degenerate; `Session::new` calls it so that a
//! misconfigured engine fails at construction rather than mid-round.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALPHABET, DEFAULT_LEVEL, DEMOTE_MIN_ERRORS, GRID_SIZE, MATCH_PROBABILITY, MIN_LEVEL,
    PROMOTE_MAX_ERRORS, TRIAL_INTERVAL_MS, TRIALS_PER_ROUND,
};
use crate::difficulty::LevelThresholds;
use crate::error::{EngineError, Result};
use crate::trial::Modality;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_level: usize,
    pub trials_per_round: usize,
    pub match_probability: f64,
    pub grid_size: usize,
    pub alphabet: Vec<char>,
    pub promote_max_errors: u32,
    pub demote_min_errors: u32,
    pub min_level: usize,
    /// Count a press on a targetless trial as a false alarm.
    pub penalize_head_presses: bool,
    pub trial_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_level: DEFAULT_LEVEL,
            trials_per_round: TRIALS_PER_ROUND,
            match_probability: MATCH_PROBABILITY,
            grid_size: GRID_SIZE,
            alphabet: ALPHABET.to_vec(),
            promote_max_errors: PROMOTE_MAX_ERRORS,
            demote_min_errors: DEMOTE_MIN_ERRORS,
            min_level: MIN_LEVEL,
            penalize_head_presses: true,
            trial_interval_ms: TRIAL_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.alphabet.is_empty() {
            return Err(invalid("alphabet is empty"));
        }
        let unique: HashSet<char> = self.alphabet.iter().copied().collect();
        if unique.len() != self.alphabet.len() {
            return Err(invalid("alphabet contains duplicate symbols"));
        }
        if self.grid_size == 0 {
            return Err(invalid("grid_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.match_probability) {
            return Err(invalid(format!(
                "match_probability {} outside [0, 1]",
                self.match_probability
            )));
        }
        if self.trials_per_round == 0 {
            return Err(invalid("trials_per_round must be at least 1"));
        }
        if self.min_level < MIN_LEVEL {
            return Err(invalid(format!(
                "min_level {} below {MIN_LEVEL}; a 1-back window is degenerate",
                self.min_level
            )));
        }
        if self.initial_level < self.min_level {
            return Err(invalid(format!(
                "initial_level {} below min_level {}",
                self.initial_level, self.min_level
            )));
        }
        if self.promote_max_errors >= self.demote_min_errors {
            return Err(invalid(format!(
                "promote_max_errors ({}) must be below demote_min_errors ({})",
                self.promote_max_errors, self.demote_min_errors
            )));
        }
        if self.trial_interval_ms == 0 {
            return Err(invalid("trial_interval_ms must be at least 1"));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> LevelThresholds {
        LevelThresholds {
            promote_max_errors: self.promote_max_errors,
            demote_min_errors: self.demote_min_errors,
            min_level: self.min_level,
        }
    }

    /// Number of distinct values a modality can take.
    pub fn domain(&self, modality: Modality) -> usize {
        match modality {
            Modality::Position => self.grid_size,
            Modality::Symbol => self.alphabet.len(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig(msg.into())
}
