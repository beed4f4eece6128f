//! Signal-detection scoring.
//!
//! Presses are classified the moment they arrive: a press on a trial whose
//! value repeats its target is a hit, anything else is a false alarm.
//! Misses can only be known once the trial is over, so they are recorded by
//! `settle`, which runs on the previous trial before the next one is
//! generated and before response flags are cleared.

use serde::{Deserialize, Serialize};

use crate::response::ResponseTracker;
use crate::trial::{Modality, Trial};

/// Classification of a single press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    FalseAlarm,
}

/// Round-level counts for one modality. Counts only grow within a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityStats {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
}

impl ModalityStats {
    pub fn errors(&self) -> u32 {
        self.misses + self.false_alarms
    }
}

/// Stats for both modalities over the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub position: ModalityStats,
    pub symbol: ModalityStats,
}

impl RoundStats {
    pub fn get(&self, modality: Modality) -> &ModalityStats {
        match modality {
            Modality::Position => &self.position,
            Modality::Symbol => &self.symbol,
        }
    }

    fn get_mut(&mut self, modality: Modality) -> &mut ModalityStats {
        match modality {
            Modality::Position => &mut self.position,
            Modality::Symbol => &mut self.symbol,
        }
    }

    /// Misses plus false alarms across both modalities.
    pub fn total_errors(&self) -> u32 {
        self.position.errors() + self.symbol.errors()
    }
}

/// Score a press on `current` for `modality` and bump the matching counter.
pub fn classify(
    stats: &mut RoundStats,
    current: &Trial,
    target: Option<&Trial>,
    modality: Modality,
) -> Outcome {
    let entry = stats.get_mut(modality);
    match target {
        Some(t) if current.matches(t, modality) => {
            entry.hits += 1;
            Outcome::Hit
        }
        _ => {
            entry.false_alarms += 1;
            Outcome::FalseAlarm
        }
    }
}

/// Record misses for a finished trial: a true match on a modality whose
/// flag was never set. Targetless trials can never miss.
///
/// `responses` must still hold the flags of `previous`.
pub fn settle(
    stats: &mut RoundStats,
    previous: &Trial,
    target: Option<&Trial>,
    responses: &ResponseTracker,
) -> u32 {
    let Some(target) = target else {
        return 0;
    };
    let mut missed = 0;
    for modality in Modality::ALL {
        if previous.matches(target, modality) && !responses.has_responded(modality) {
            stats.get_mut(modality).misses += 1;
            missed += 1;
        }
    }
    missed
}
