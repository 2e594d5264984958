use crate::bidding::estimator::BidEstimate;
use crate::model::card::Card;
use crate::model::suit::{Suit, Trump};
use serde::{Deserialize, Serialize};

/// Intermediate values behind a bid, for logging and inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidExplanation {
    pub estimate: BidEstimate,
    pub trump: Trump,
    pub players: usize,
    pub suits: Vec<SuitExplanation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitExplanation {
    pub suit: Suit,
    pub is_trump: bool,
    pub winners: f64,
    pub cards: Vec<CardExplanation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardExplanation {
    pub card: Card,
    pub gap_above: usize,
    pub cover_required: usize,
    pub probability: f64,
}

impl BidExplanation {
    pub fn card(&self, card: Card) -> Option<&CardExplanation> {
        self.suits
            .iter()
            .filter(|suit| suit.suit == card.suit)
            .flat_map(|suit| suit.cards.iter())
            .find(|entry| entry.card == card)
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardExplanation> {
        self.suits.iter().flat_map(|suit| suit.cards.iter())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
