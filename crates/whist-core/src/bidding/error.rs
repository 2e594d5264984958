use crate::model::card::Card;
use thiserror::Error;

/// Inputs the estimator refuses to evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BidError {
    #[error("cannot bid on an empty hand")]
    EmptyHand,
    #[error("a round needs at least 2 players, got {players}")]
    TooFewPlayers { players: usize },
    #[error("{players} hands of {hand_size} cards exceed the pack (max {max} cards each)")]
    HandTooLarge {
        hand_size: usize,
        players: usize,
        max: usize,
    },
    #[error("{bids} prior bids recorded but only {players} players at the table")]
    TooManyPriorBids { bids: usize, players: usize },
    #[error("prior bid #{index} of {bid} exceeds the hand size {hand_size}")]
    BidOutOfRange {
        index: usize,
        bid: u8,
        hand_size: usize,
    },
    #[error("card {card} appears more than once in the hand")]
    DuplicateCard { card: Card },
    #[error("damping weight {weight} must be a finite value in [0, 1]")]
    InvalidDampingWeight { weight: f64 },
}
