//! Bid estimation for a Contract Whist hand.
//!
//! This module is composed of:
//! - `constants`: pack dimensions and the empirical damping weight.
//! - `odds`: per-opponent suit-length probabilities and the recursive
//!   winner probability of a single card.
//! - `estimator`: request validation, suit-by-suit winner counting, rounding
//!   and the last-bidder adjustment.
//! - `explain`: per-card breakdown returned by `BidEstimator::explain`.

pub mod constants;
mod error;
mod estimator;
mod explain;
mod odds;

pub use constants::{CARDS_IN_PACK, CARDS_IN_SUIT, DEFAULT_DAMPING_WEIGHT, SUIT_COUNT};
pub use error::BidError;
pub use estimator::{
    BidAdjustment, BidEstimate, BidEstimator, BidEstimatorConfig, BidRequest, estimate_bid,
    round_expected,
};
pub use explain::{BidExplanation, CardExplanation, SuitExplanation};
pub use odds::ShortSuitRule;
