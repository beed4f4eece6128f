//! Simulated participant for headless rounds.
//!
//! Presses each modality on a true match with probability `hit_rate` and on
//! a non-match with probability `false_alarm_rate`.

use anyhow::{Result, ensure};
use nback_core::{Modality, Session};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct SimulatedParticipant {
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
}

impl SimulatedParticipant {
    pub fn new(hit_rate: f64, false_alarm_rate: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&hit_rate),
            "hit rate {hit_rate} outside [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&false_alarm_rate),
            "false-alarm rate {false_alarm_rate} outside [0, 1]"
        );
        Ok(Self {
            hit_rate,
            false_alarm_rate,
        })
    }

    /// Respond to the session's current trial.
    pub fn respond(&self, session: &mut Session, rng: &mut impl Rng) {
        let Some(current) = session.current_trial().copied() else {
            return;
        };
        let target = session.target_trial().copied();

        for modality in Modality::ALL {
            let is_match = target.is_some_and(|t| current.matches(&t, modality));
            let p = if is_match {
                self.hit_rate
            } else {
                self.false_alarm_rate
            };
            if rng.random_bool(p) {
                session.record(modality);
            }
        }
    }
}
