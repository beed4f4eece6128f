//! Per-trial response flags.
//!
//! One flag per modality, set by the first press in a trial and cleared
//! exactly once when the next trial is generated. The flag gates repeated
//! input (key repeat must not earn double credit) and is read by settlement
//! to decide whether a true match was missed, so it must be cleared only
//! after settlement has run.

use serde::{Deserialize, Serialize};

use crate::trial::Modality;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTracker {
    position: bool,
    symbol: bool,
}

/// Result of `ResponseTracker::record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    pub already_responded: bool,
}

impl ResponseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_responded(&self, modality: Modality) -> bool {
        match modality {
            Modality::Position => self.position,
            Modality::Symbol => self.symbol,
        }
    }

    /// Mark `modality` as answered for this trial. Only the first call per
    /// trial reports `already_responded: false`.
    pub fn record(&mut self, modality: Modality) -> Recorded {
        let flag = match modality {
            Modality::Position => &mut self.position,
            Modality::Symbol => &mut self.symbol,
        };
        if *flag {
            return Recorded {
                already_responded: true,
            };
        }
        *flag = true;
        Recorded {
            already_responded: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
