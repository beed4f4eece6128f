//! Adaptive level control between rounds.
//!
//! The rule is a three-band step on the round's total error count
//! (misses + false alarms over both modalities): few errors promote, many
//! errors demote, anything in between holds.

use serde::{Deserialize, Serialize};

use crate::constants::{DEMOTE_MIN_ERRORS, MIN_LEVEL, PROMOTE_MAX_ERRORS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThresholds {
    /// Promote when total errors are at or below this.
    pub promote_max_errors: u32,
    /// Demote when total errors are at or above this.
    pub demote_min_errors: u32,
    /// Demotion never goes below this level.
    pub min_level: usize,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            promote_max_errors: PROMOTE_MAX_ERRORS,
            demote_min_errors: DEMOTE_MIN_ERRORS,
            min_level: MIN_LEVEL,
        }
    }
}

/// Direction the controller moved the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelChange {
    Promote,
    Hold,
    Demote,
}

impl LevelThresholds {
    pub fn next_level(&self, n: usize, total_errors: u32) -> usize {
        if total_errors <= self.promote_max_errors {
            n + 1
        } else if total_errors >= self.demote_min_errors {
            n.saturating_sub(1).max(self.min_level)
        } else {
            n
        }
    }
}

/// Next level under the default thresholds.
pub fn next_level(n: usize, total_errors: u32) -> usize {
    LevelThresholds::default().next_level(n, total_errors)
}

pub fn classify_change(from: usize, to: usize) -> LevelChange {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => LevelChange::Promote,
        std::cmp::Ordering::Equal => LevelChange::Hold,
        std::cmp::Ordering::Less => LevelChange::Demote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_promote_on_few_errors() {
        assert_eq!(next_level(3, 0), 4);
        assert_eq!(next_level(3, 1), 4);
        assert_eq!(next_level(3, 2), 4);
    }

    #[test]
    fn test_hold_in_middle_band() {
        assert_eq!(next_level(3, 3), 3);
        assert_eq!(next_level(3, 4), 3);
        assert_eq!(next_level(3, 5), 3);
    }

    #[test]
    fn test_demote_on_many_errors() {
        assert_eq!(next_level(3, 6), 2);
        assert_eq!(next_level(3, 7), 2);
        assert_eq!(next_level(5, 40), 4);
    }

    #[test]
    fn test_demote_floors_at_min_level() {
        assert_eq!(next_level(2, 7), 2);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = LevelThresholds {
            promote_max_errors: 0,
            demote_min_errors: 3,
            min_level: 1,
        };
        assert_eq!(t.next_level(2, 0), 3);
        assert_eq!(t.next_level(2, 1), 2);
        assert_eq!(t.next_level(2, 3), 1);
        assert_eq!(t.next_level(1, 3), 1);
    }

    #[test]
    fn test_classify_change() {
        assert_eq!(classify_change(2, 3), LevelChange::Promote);
        assert_eq!(classify_change(3, 3), LevelChange::Hold);
        assert_eq!(classify_change(3, 2), LevelChange::Demote);
    }

    proptest! {
        #[test]
        fn prop_level_moves_at_most_one_step(n in 2usize..50, errors in 0u32..100) {
            let next = next_level(n, errors);
            prop_assert!(next + 1 >= n && next <= n + 1);
        }

        #[test]
        fn prop_never_below_floor(n in 2usize..50, errors in 0u32..100) {
            prop_assert!(next_level(n, errors) >= MIN_LEVEL);
        }

        #[test]
        fn prop_monotone_in_errors(n in 2usize..50, a in 0u32..100, b in 0u32..100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(next_level(n, lo) >= next_level(n, hi));
        }
    }
}
