use super::BidderContext;
use crate::policy::Bidder;
use whist_core::bidding::{BidError, BidEstimate};
use whist_core::model::hand::Hand;
use whist_core::model::suit::Trump;

/// One seat's bid within a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatBid {
    pub seat: usize,
    pub estimate: BidEstimate,
}

impl SeatBid {
    pub fn bid(&self) -> u8 {
        self.estimate.bid
    }
}

/// Collects a bid from every seat, starting left of the dealer so the dealer
/// bids last. Each seat sees the bids declared before it.
///
/// `hands[seat]` is that seat's hand; results are in bidding order.
pub fn bid_round<B>(
    bidder: &mut B,
    hands: &[Hand],
    trump: Trump,
    dealer: usize,
) -> Result<Vec<SeatBid>, BidError>
where
    B: Bidder + ?Sized,
{
    let players = hands.len();
    if players < 2 {
        return Err(BidError::TooFewPlayers { players });
    }

    let mut declared: Vec<u8> = Vec::with_capacity(players);
    let mut bids = Vec::with_capacity(players);
    for offset in 1..=players {
        let seat = (dealer + offset) % players;
        let ctx = BidderContext {
            seat,
            hand: &hands[seat],
            trump,
            prior_bids: &declared,
            players,
        };
        let estimate = bidder.choose_bid(&ctx)?;
        declared.push(estimate.bid);
        bids.push(SeatBid { seat, estimate });
    }
    Ok(bids)
}
