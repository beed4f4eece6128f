/// Starting lag for a fresh session.
pub const DEFAULT_LEVEL: usize = 2;

/// Lowest lag the adaptive controller will demote to. A 1-back window
/// makes matching trivial.
pub const MIN_LEVEL: usize = 2;

/// Trials presented per round.
pub const TRIALS_PER_ROUND: usize = 20;

/// Per-modality probability of forcing a repeat of the target value.
pub const MATCH_PROBABILITY: f64 = 0.3;

/// Number of cells in the 3x3 position grid.
pub const GRID_SIZE: usize = 9;

/// Spoken-letter alphabet for the symbol stream.
pub const ALPHABET: [char; 8] = ['C', 'H', 'K', 'L', 'Q', 'R', 'S', 'T'];

/// Round errors at or below this promote to `n + 1`.
pub const PROMOTE_MAX_ERRORS: u32 = 2;

/// Round errors at or above this demote to `n - 1`.
pub const DEMOTE_MIN_ERRORS: u32 = 6;

/// Trial clock period.
pub const TRIAL_INTERVAL_MS: u64 = 3000;
