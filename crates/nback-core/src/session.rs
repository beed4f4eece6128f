//! Round controller: the single owner of session state.
//!
//! State machine: `Idle -> Playing -> RoundEnd -> (Playing | Idle)`.
//!
//! Each `tick` runs in a fixed order:
//! 1. settle the trial that just finished (misses read its response flags),
//! 2. end the round if every trial has been shown, otherwise
//! 3. generate the next trial, append it, clear the response flags.
//!
//! Steps 1 and 3 must not be reordered: clearing flags or generating first
//! would score answered matches as misses. All mutation goes through
//! `&mut self`, so callers that share a session across tasks must wrap the
//! whole session in one lock.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::evaluator::{Outcome, RoundStats, classify, settle};
use crate::generator::{StimulusSource, generate};
use crate::report::RoundReport;
use crate::response::ResponseTracker;
use crate::trial::{Modality, Trial, target_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Playing,
    RoundEnd,
}

/// What a clock tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session was not playing; nothing changed.
    Ignored,
    /// A new trial was presented.
    Advanced(Trial),
    /// The last trial was settled and the level re-chosen.
    RoundEnded(RoundReport),
}

/// What a press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Scored(Outcome),
    /// Press on a targetless trial with head penalties disabled.
    Acknowledged,
    /// Modality already answered this trial.
    AlreadyResponded,
    /// Session is not playing.
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    n: usize,
    status: SessionStatus,
    history: Vec<Trial>,
    current_index: usize,
    responses: ResponseTracker,
    stats: RoundStats,
    rounds_completed: u32,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let level = config.initial_level;
        Self::with_level(config, level)
    }

    /// Session that starts at `level` instead of the configured initial level.
    /// `level` is raised to the configured floor if below it.
    pub fn with_level(config: EngineConfig, level: usize) -> Result<Self> {
        config.validate()?;
        let n = level.max(config.min_level);
        Ok(Self {
            config,
            n,
            status: SessionStatus::Idle,
            history: Vec::new(),
            current_index: 0,
            responses: ResponseTracker::new(),
            stats: RoundStats::default(),
            rounds_completed: 0,
        })
    }

    /// Begin a round at the current level and present its first trial.
    /// Any round in progress is discarded.
    pub fn start(&mut self, source: &mut impl StimulusSource) -> Trial {
        self.clear_round();
        self.status = SessionStatus::Playing;

        let first = generate(&self.history, self.n, &self.config, source);
        self.history.push(first);
        self.current_index = 1;

        tracing::debug!(
            level = self.n,
            trials = self.config.trials_per_round,
            "round started"
        );
        first
    }

    pub fn tick(&mut self, source: &mut impl StimulusSource) -> TickOutcome {
        if self.status != SessionStatus::Playing {
            return TickOutcome::Ignored;
        }

        let finished = self.current_index - 1;
        let target = target_index(finished, self.n).map(|i| &self.history[i]);
        let missed = settle(
            &mut self.stats,
            &self.history[finished],
            target,
            &self.responses,
        );
        if missed > 0 {
            tracing::debug!(trial = finished, missed, "settled with misses");
        }

        if self.current_index >= self.config.trials_per_round {
            return TickOutcome::RoundEnded(self.end_round());
        }

        let trial = generate(&self.history, self.n, &self.config, source);
        self.history.push(trial);
        self.responses.reset();
        self.current_index += 1;

        tracing::debug!(
            index = self.current_index - 1,
            position = trial.position,
            symbol = %trial.symbol,
            "trial presented"
        );
        TickOutcome::Advanced(trial)
    }

    /// Register a match press on the current trial.
    pub fn record(&mut self, modality: Modality) -> RecordOutcome {
        if self.status != SessionStatus::Playing {
            return RecordOutcome::Inactive;
        }
        if self.responses.record(modality).already_responded {
            return RecordOutcome::AlreadyResponded;
        }

        let index = self.current_index - 1;
        let target = target_index(index, self.n).map(|i| &self.history[i]);
        if target.is_none() && !self.config.penalize_head_presses {
            return RecordOutcome::Acknowledged;
        }

        let outcome = classify(&mut self.stats, &self.history[index], target, modality);
        tracing::debug!(trial = index, %modality, ?outcome, "response classified");
        RecordOutcome::Scored(outcome)
    }

    /// `record` for untrusted input tokens. Unknown tokens are logged and
    /// rejected without touching state.
    pub fn record_token(&mut self, token: &str) -> Result<RecordOutcome> {
        match token.parse::<Modality>() {
            Ok(modality) => Ok(self.record(modality)),
            Err(e) => {
                tracing::warn!(token, "rejected input: {e}");
                Err(e)
            }
        }
    }

    /// Abandon the session: drop in-flight trial state, keep the level.
    pub fn stop(&mut self) {
        self.clear_round();
        self.status = SessionStatus::Idle;
    }

    /// `stop`, then return the level to its configured initial value.
    pub fn reset(&mut self) {
        self.stop();
        self.n = self.config.initial_level;
    }

    fn clear_round(&mut self) {
        self.history.clear();
        self.current_index = 0;
        self.responses.reset();
        self.stats = RoundStats::default();
    }

    fn end_round(&mut self) -> RoundReport {
        let total_errors = self.stats.total_errors();
        let next = self.config.thresholds().next_level(self.n, total_errors);
        let report = RoundReport::scored(
            self.n,
            next,
            &self.history,
            self.stats,
            self.config.penalize_head_presses,
        );

        tracing::info!(
            level = self.n,
            next_level = next,
            total_errors,
            "round complete"
        );

        self.n = next;
        self.status = SessionStatus::RoundEnd;
        self.rounds_completed += 1;
        report
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current lag `n`.
    pub fn level(&self) -> usize {
        self.n
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    pub fn history(&self) -> &[Trial] {
        &self.history
    }

    /// Trials presented so far this round. Always equals `history().len()`.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_trials(&self) -> usize {
        self.config.trials_per_round
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.history.last()
    }

    pub fn target_trial(&self) -> Option<&Trial> {
        let index = self.current_index.checked_sub(1)?;
        target_index(index, self.n).map(|i| &self.history[i])
    }

    pub fn stats(&self) -> &RoundStats {
        &self.stats
    }

    pub fn responses(&self) -> &ResponseTracker {
        &self.responses
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }
}
