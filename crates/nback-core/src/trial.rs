//! Stimulus types: the two modalities and the trial that carries one value
//! for each.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One of the two independent stimulus channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Cell lit on the 3x3 grid.
    Position,
    /// Letter played audibly.
    Symbol,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Position, Modality::Symbol];

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Position => "position",
            Modality::Symbol => "symbol",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = EngineError;

    /// Accepts the canonical names, the short forms, the "sound" alias used by
    /// audio front-ends, and the default key bindings (`l` position, `a` symbol).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" | "pos" | "l" => Ok(Modality::Position),
            "symbol" | "sym" | "sound" | "a" => Ok(Modality::Symbol),
            _ => Err(EngineError::InvalidModality(s.to_string())),
        }
    }
}

/// A single dual-modality stimulus presentation. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    /// Grid cell index, `0..grid_size`.
    pub position: usize,
    pub symbol: char,
}

impl Trial {
    pub fn new(position: usize, symbol: char) -> Self {
        Self { position, symbol }
    }

    /// Whether this trial repeats `other` on the given channel.
    pub fn matches(&self, other: &Trial, modality: Modality) -> bool {
        match modality {
            Modality::Position => self.position == other.position,
            Modality::Symbol => self.symbol == other.symbol,
        }
    }
}

/// Index of the trial that trial `index` is compared against, if any.
///
/// Trials `0..n` have nothing `n` steps behind them and are targetless.
pub fn target_index(index: usize, n: usize) -> Option<usize> {
    index.checked_sub(n)
}
