//! Stimulus generation against the lag window.
//!
//! Each new trial is compared against the trial `n` steps back. When that
//! target exists, each modality independently repeats the target's value
//! with probability `p`; otherwise (and always for targetless trials) it is
//! drawn uniformly from the modality's domain. A uniform draw can still land
//! on the target value, so the observed repeat rate is
//! `p + (1 - p) / domain` rather than `p`.

use rand::Rng;

use crate::config::EngineConfig;
use crate::trial::{Modality, Trial, target_index};

/// Random decisions the generator needs. Implemented for every `rand::Rng`;
/// tests substitute scripted sources to pin exact sequences.
pub trait StimulusSource {
    /// Bernoulli draw: should `modality` repeat its target value?
    fn force_match(&mut self, modality: Modality, probability: f64) -> bool;

    /// Uniform draw from `0..domain` for `modality`.
    fn pick(&mut self, modality: Modality, domain: usize) -> usize;
}

impl<R: Rng + ?Sized> StimulusSource for R {
    fn force_match(&mut self, _modality: Modality, probability: f64) -> bool {
        self.random_bool(probability)
    }

    fn pick(&mut self, _modality: Modality, domain: usize) -> usize {
        self.random_range(0..domain)
    }
}

/// Produce the trial that follows `history` at lag `n`.
///
/// Pure apart from the draws taken from `source`. `config` must have passed
/// `EngineConfig::validate`.
pub fn generate(
    history: &[Trial],
    n: usize,
    config: &EngineConfig,
    source: &mut impl StimulusSource,
) -> Trial {
    let target = target_index(history.len(), n).map(|i| &history[i]);

    let position = match target {
        Some(t) if source.force_match(Modality::Position, config.match_probability) => t.position,
        _ => source.pick(Modality::Position, config.grid_size),
    };

    let symbol = match target {
        Some(t) if source.force_match(Modality::Symbol, config.match_probability) => t.symbol,
        _ => config.alphabet[source.pick(Modality::Symbol, config.alphabet.len())],
    };

    Trial { position, symbol }
}

/// Observed per-modality repeat rate given forced-match probability `p` and
/// a uniform fallback over `domain` values.
pub fn expected_match_rate(p: f64, domain: usize) -> f64 {
    if domain == 0 {
        return p;
    }
    p + (1.0 - p) / domain as f64
}
