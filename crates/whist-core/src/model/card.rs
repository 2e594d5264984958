use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Descending rank within suit; suits in declaration order.
    pub fn sort_key(self) -> (Suit, core::cmp::Reverse<Rank>) {
        (self.suit, core::cmp::Reverse(self.rank))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("card '{0}' is too short")]
    TooShort(String),
    #[error("card '{text}' has unknown rank '{rank}'")]
    UnknownRank { text: String, rank: String },
    #[error("card '{text}' has unknown suit '{suit}'")]
    UnknownSuit { text: String, suit: char },
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Accepts `AS`, `10h`, `TD`, `2♣`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut chars = text.chars();
        let suit_char = chars
            .next_back()
            .ok_or_else(|| CardParseError::TooShort(text.to_string()))?;
        let rank_text = chars.as_str();
        if rank_text.is_empty() {
            return Err(CardParseError::TooShort(text.to_string()));
        }
        let suit = Suit::from_symbol(suit_char).ok_or(CardParseError::UnknownSuit {
            text: text.to_string(),
            suit: suit_char,
        })?;
        let rank = Rank::from_symbol(rank_text).ok_or_else(|| CardParseError::UnknownRank {
            text: text.to_string(),
            rank: rank_text.to_string(),
        })?;
        Ok(Card::new(rank, suit))
    }
}
