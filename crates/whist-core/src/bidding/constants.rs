//! Fixed dimensions of the pack and tuning defaults for the estimator.

/// Cards in a standard pack.
pub const CARDS_IN_PACK: usize = 52;

/// Cards in each suit.
pub const CARDS_IN_SUIT: usize = 13;

/// Number of suits in the pack.
pub const SUIT_COUNT: usize = 4;

/// Rank one above the ace, used as the starting point when walking a suit
/// from the top.
pub const ABOVE_ACE: u8 = CARDS_IN_SUIT as u8 + 1;

/// Chance that a higher card which is in play still fails to beat ours.
///
/// Chosen empirically rather than derived; an exact combinatorial term could
/// replace it.
pub const DEFAULT_DAMPING_WEIGHT: f64 = 0.6;
