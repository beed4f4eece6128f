//! End-of-round summary handed to persistence and score submission.

use serde::{Deserialize, Serialize};

use crate::difficulty::{LevelChange, classify_change};
use crate::evaluator::RoundStats;
use crate::sdt::d_prime;
use crate::trial::{Modality, Trial, target_index};

/// Per-modality pair of values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerModality<T> {
    pub position: T,
    pub symbol: T,
}

impl<T: Copy> PerModality<T> {
    pub fn get(&self, modality: Modality) -> T {
        match modality {
            Modality::Position => self.position,
            Modality::Symbol => self.symbol,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Lag the round was played at.
    pub level: usize,
    /// Lag chosen for the next round. This is the round's score.
    pub next_level: usize,
    pub change: LevelChange,
    pub trials: usize,
    pub stats: RoundStats,
    /// Trials whose value repeated the target, per modality.
    pub targets: PerModality<u32>,
    pub total_errors: u32,
    pub d_prime: PerModality<f64>,
}

impl RoundReport {
    /// Report for a round whose targetless head was scored.
    pub fn new(level: usize, next_level: usize, history: &[Trial], stats: RoundStats) -> Self {
        Self::scored(level, next_level, history, stats, true)
    }

    /// `head_scored` says whether presses on the first `level` trials could
    /// count as false alarms; if not, those trials are left out of the
    /// noise count behind d'.
    pub fn scored(
        level: usize,
        next_level: usize,
        history: &[Trial],
        stats: RoundStats,
        head_scored: bool,
    ) -> Self {
        let targets = count_targets(history, level);
        let noise_trials = if head_scored {
            history.len()
        } else {
            history.len().saturating_sub(level)
        };
        let d_prime = PerModality {
            position: modality_d_prime(&stats, &targets, noise_trials, Modality::Position),
            symbol: modality_d_prime(&stats, &targets, noise_trials, Modality::Symbol),
        };
        Self {
            level,
            next_level,
            change: classify_change(level, next_level),
            trials: history.len(),
            stats,
            targets,
            total_errors: stats.total_errors(),
            d_prime,
        }
    }

    pub fn score(&self) -> usize {
        self.next_level
    }
}

/// Number of trials in `history` that repeat their lag-`n` target.
pub fn count_targets(history: &[Trial], n: usize) -> PerModality<u32> {
    let mut counts = PerModality::<u32>::default();
    for (i, trial) in history.iter().enumerate() {
        let Some(t) = target_index(i, n) else {
            continue;
        };
        let target = &history[t];
        if trial.matches(target, Modality::Position) {
            counts.position += 1;
        }
        if trial.matches(target, Modality::Symbol) {
            counts.symbol += 1;
        }
    }
    counts
}

fn modality_d_prime(
    stats: &RoundStats,
    targets: &PerModality<u32>,
    scored_trials: usize,
    modality: Modality,
) -> f64 {
    let s = stats.get(modality);
    let signal = targets.get(modality);
    let noise = (scored_trials as u32).saturating_sub(signal);
    d_prime(s.hits, signal, s.false_alarms, noise)
}
