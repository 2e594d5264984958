use crate::model::card::{Card, CardParseError};
use crate::model::suit::Suit;
use core::str::FromStr;
use thiserror::Error;

/// Cards held by one player for the current round.
///
/// Cards are kept sorted by suit, then by descending rank, so that each
/// suit's run can be read top-down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

/// One suit's holding within a hand, highest rank first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSuit {
    pub suit: Suit,
    pub cards: Vec<Card>,
}

impl HandSuit {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error(transparent)]
    Parse(#[from] CardParseError),
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Builds a hand without checking for duplicates.
    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn try_from_cards(cards: Vec<Card>) -> Result<Self, HandError> {
        let hand = Self::with_cards(cards);
        if let Some(card) = hand.first_duplicate() {
            return Err(HandError::DuplicateCard(card));
        }
        Ok(hand)
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn count_in_suit(&self, suit: Suit) -> usize {
        self.cards.iter().filter(|card| card.suit == suit).count()
    }

    /// Non-empty suits of the hand, each with cards in descending rank.
    pub fn suits(&self) -> Vec<HandSuit> {
        Suit::ALL
            .iter()
            .filter_map(|&suit| {
                let cards: Vec<Card> = self
                    .cards
                    .iter()
                    .copied()
                    .filter(|card| card.suit == suit)
                    .collect();
                (!cards.is_empty()).then_some(HandSuit { suit, cards })
            })
            .collect()
    }

    /// First card held twice, if any. Relies on the sorted order.
    pub fn first_duplicate(&self) -> Option<Card> {
        self.cards
            .windows(2)
            .find(|pair| pair[0] == pair[1])
            .map(|pair| pair[0])
    }

    fn sort(&mut self) {
        self.cards.sort_by_key(|card| card.sort_key());
    }
}

impl FromStr for Hand {
    type Err = HandError;

    /// Parses whitespace or comma separated cards, e.g. `"AS KS 2C"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse::<Card>)
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_cards(cards)
    }
}
