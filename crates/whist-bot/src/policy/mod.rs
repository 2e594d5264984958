mod heuristic;

pub use heuristic::HeuristicBidder;

use crate::bot::BidderContext;
use whist_core::bidding::{BidError, BidEstimate};

/// Unified interface for bidding seats
pub trait Bidder: Send {
    /// Choose a bid for the seat described by `ctx`
    fn choose_bid(&mut self, ctx: &BidderContext<'_>) -> Result<BidEstimate, BidError>;

    /// Label used in logs and survey output
    fn name(&self) -> &str;
}
