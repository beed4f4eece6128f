//! Dual n-back working-memory engine.
//!
//! Generates a synchronized position/symbol stimulus stream with a
//! controlled repeat probability against a lag-`n` window, scores presses
//! as hits, misses and false alarms per modality, and re-levels `n` between
//! rounds from the round's error count.
//!
//! Zero I/O. The caller owns the random source and drives `Session::tick`
//! from its own clock.

pub mod config;
pub mod constants;
pub mod difficulty;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod report;
pub mod response;
pub mod sdt;
pub mod session;
pub mod trial;

pub use config::EngineConfig;
pub use constants::{
    ALPHABET, DEFAULT_LEVEL, DEMOTE_MIN_ERRORS, GRID_SIZE, MATCH_PROBABILITY, MIN_LEVEL,
    PROMOTE_MAX_ERRORS, TRIAL_INTERVAL_MS, TRIALS_PER_ROUND,
};
pub use difficulty::{LevelChange, LevelThresholds, classify_change, next_level};
pub use error::{EngineError, Result};
pub use evaluator::{ModalityStats, Outcome, RoundStats, classify, settle};
pub use generator::{StimulusSource, expected_match_rate, generate};
pub use report::{PerModality, RoundReport, count_targets};
pub use response::ResponseTracker;
pub use sdt::{d_prime, probit};
pub use session::{RecordOutcome, Session, SessionStatus, TickOutcome};
pub use trial::{Modality, Trial, target_index};
