use std::time::{Duration, Instant};

use whist_bot::{Bidder, BidderContext};
use whist_core::bidding::{BidError, BidEstimate};

/// Wraps a bidder and records how long each decision took.
pub struct TimedBidder<B> {
    inner: B,
    samples: Vec<Duration>,
}

impl<B: Bidder> TimedBidder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            samples: Vec::new(),
        }
    }

    /// Returns the latencies recorded since the last drain, in microseconds.
    pub fn drain_micros(&mut self) -> Vec<f64> {
        self.samples
            .drain(..)
            .map(|sample| sample.as_secs_f64() * 1_000_000.0)
            .collect()
    }
}

impl<B: Bidder> Bidder for TimedBidder<B> {
    fn choose_bid(&mut self, ctx: &BidderContext<'_>) -> Result<BidEstimate, BidError> {
        let start = Instant::now();
        let result = self.inner.choose_bid(ctx);
        self.samples.push(start.elapsed());
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whist_bot::HeuristicBidder;
    use whist_core::model::hand::Hand;
    use whist_core::model::suit::Trump;

    #[test]
    fn records_one_sample_per_decision() {
        let hand: Hand = "AS 2D".parse().expect("valid hand");
        let ctx = BidderContext {
            seat: 0,
            hand: &hand,
            trump: Trump::Spades,
            prior_bids: &[],
            players: 3,
        };
        let mut timed = TimedBidder::new(HeuristicBidder::default());
        timed.choose_bid(&ctx).expect("valid");
        timed.choose_bid(&ctx).expect("valid");
        assert_eq!(timed.name(), "heuristic");
        let samples = timed.drain_micros();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|value| *value >= 0.0));
        assert!(timed.drain_micros().is_empty());
    }
}
