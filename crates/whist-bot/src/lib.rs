pub mod bot;
pub mod policy;

pub use bot::{BidPlanner, BidderContext, BotFeatures, SeatBid, bid_round};
pub use policy::{Bidder, HeuristicBidder};
