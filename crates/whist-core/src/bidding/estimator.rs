use crate::bidding::constants::{ABOVE_ACE, CARDS_IN_PACK, DEFAULT_DAMPING_WEIGHT};
use crate::bidding::error::BidError;
use crate::bidding::explain::{BidExplanation, CardExplanation, SuitExplanation};
use crate::bidding::odds::{ShortSuitRule, TableOdds};
use crate::model::hand::{Hand, HandSuit};
use crate::model::suit::Trump;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidEstimatorConfig {
    #[serde(default = "default_damping_weight")]
    pub damping_weight: f64,
    #[serde(default)]
    pub short_suit_rule: ShortSuitRule,
}

impl Default for BidEstimatorConfig {
    fn default() -> Self {
        Self {
            damping_weight: DEFAULT_DAMPING_WEIGHT,
            short_suit_rule: ShortSuitRule::default(),
        }
    }
}

impl BidEstimatorConfig {
    pub fn validate(&self) -> Result<(), BidError> {
        let weight = self.damping_weight;
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(BidError::InvalidDampingWeight { weight });
        }
        Ok(())
    }
}

fn default_damping_weight() -> f64 {
    DEFAULT_DAMPING_WEIGHT
}

/// Everything the estimator needs to know about the round in progress.
#[derive(Debug, Clone, Copy)]
pub struct BidRequest<'a> {
    pub hand: &'a Hand,
    pub trump: Trump,
    /// Bids already declared this round, in bidding order.
    pub prior_bids: &'a [u8],
    pub players: usize,
}

impl<'a> BidRequest<'a> {
    pub fn new(hand: &'a Hand, trump: Trump, prior_bids: &'a [u8], players: usize) -> Self {
        Self {
            hand,
            trump,
            prior_bids,
            players,
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    pub fn is_last_bidder(&self) -> bool {
        self.prior_bids.len() + 1 == self.players
    }

    /// The bid that would make the total equal the number of tricks, if any.
    pub fn forbidden_bid(&self) -> Option<u8> {
        if !self.is_last_bidder() {
            return None;
        }
        let declared: usize = self.prior_bids.iter().map(|&bid| usize::from(bid)).sum();
        self.hand_size()
            .checked_sub(declared)
            .and_then(|remaining| u8::try_from(remaining).ok())
    }

    fn validate(&self) -> Result<(), BidError> {
        let hand_size = self.hand_size();
        if hand_size == 0 {
            return Err(BidError::EmptyHand);
        }
        if self.players < 2 {
            return Err(BidError::TooFewPlayers {
                players: self.players,
            });
        }
        let max = CARDS_IN_PACK / self.players;
        if hand_size > max {
            return Err(BidError::HandTooLarge {
                hand_size,
                players: self.players,
                max,
            });
        }
        if let Some(card) = self.hand.first_duplicate() {
            return Err(BidError::DuplicateCard { card });
        }
        if self.prior_bids.len() >= self.players {
            return Err(BidError::TooManyPriorBids {
                bids: self.prior_bids.len(),
                players: self.players,
            });
        }
        if let Some((index, &bid)) = self
            .prior_bids
            .iter()
            .enumerate()
            .find(|(_, bid)| usize::from(**bid) > hand_size)
        {
            return Err(BidError::BidOutOfRange {
                index,
                bid,
                hand_size,
            });
        }
        Ok(())
    }
}

/// Direction the last bidder's estimate was moved to keep the total of all
/// bids away from the number of tricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidAdjustment {
    Raised,
    Lowered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidEstimate {
    pub bid: u8,
    /// Sum of per-card winner probabilities before rounding.
    pub expected_tricks: f64,
    /// Rounded expectation before the last-bidder adjustment.
    pub naive_bid: u8,
    pub adjustment: Option<BidAdjustment>,
}

/// Trick-count estimator for a hand at bidding time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidEstimator {
    config: BidEstimatorConfig,
}

impl BidEstimator {
    pub const fn new(config: BidEstimatorConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> BidEstimatorConfig {
        self.config
    }

    pub fn estimate(&self, request: &BidRequest<'_>) -> Result<BidEstimate, BidError> {
        let odds = self.prepare(request)?;
        let expected_tricks = request
            .hand
            .suits()
            .iter()
            .map(|holding| count_suit_winners(&odds, holding, None))
            .sum();
        Ok(settle_bid(request, expected_tricks))
    }

    /// Same as [`BidEstimator::estimate`], also recording every card's
    /// winner probability.
    pub fn explain(&self, request: &BidRequest<'_>) -> Result<BidExplanation, BidError> {
        let odds = self.prepare(request)?;
        let mut suits = Vec::new();
        let mut expected_tricks = 0.0;
        for holding in request.hand.suits() {
            let mut cards = Vec::with_capacity(holding.len());
            let winners = count_suit_winners(&odds, &holding, Some(&mut cards));
            expected_tricks += winners;
            suits.push(SuitExplanation {
                suit: holding.suit,
                is_trump: request.trump.is_trump(holding.suit),
                winners,
                cards,
            });
        }
        Ok(BidExplanation {
            estimate: settle_bid(request, expected_tricks),
            trump: request.trump,
            players: request.players,
            suits,
        })
    }

    fn prepare(&self, request: &BidRequest<'_>) -> Result<TableOdds, BidError> {
        self.config.validate()?;
        request.validate()?;
        Ok(TableOdds {
            players: request.players,
            hand_size: request.hand_size(),
            trump: request.trump,
            rule: self.config.short_suit_rule,
            damping_weight: self.config.damping_weight,
        })
    }
}

/// Estimates a bid with the default configuration.
pub fn estimate_bid(
    hand: &Hand,
    trump: Trump,
    prior_bids: &[u8],
    players: usize,
) -> Result<u8, BidError> {
    let request = BidRequest::new(hand, trump, prior_bids, players);
    BidEstimator::default()
        .estimate(&request)
        .map(|estimate| estimate.bid)
}

/// Expected winners from one suit, walking its cards from the top.
fn count_suit_winners(
    odds: &TableOdds,
    holding: &HandSuit,
    mut record: Option<&mut Vec<CardExplanation>>,
) -> f64 {
    let own_in_suit = holding.len();
    let mut last_rank = ABOVE_ACE;
    let mut missing = 0usize;
    let mut winners = 0.0;

    for &card in &holding.cards {
        let rank = card.rank.value();
        missing += usize::from(last_rank.saturating_sub(rank + 1));
        last_rank = rank;
        let probability = odds.winner_probability(missing, missing + 1, card, own_in_suit);
        winners += probability;
        if let Some(cards) = record.as_deref_mut() {
            cards.push(CardExplanation {
                card,
                gap_above: missing,
                cover_required: missing + 1,
                probability,
            });
        }
    }

    winners
}

/// Round-half-up, pinned so that `x.5` always goes up.
pub fn round_expected(expected: f64) -> f64 {
    (expected + 0.5).floor()
}

fn settle_bid(request: &BidRequest<'_>, expected_tricks: f64) -> BidEstimate {
    let hand_size = i64::try_from(request.hand_size()).unwrap_or(i64::MAX);
    let rounded = (round_expected(expected_tricks) as i64).clamp(0, hand_size);
    let naive_bid = u8::try_from(rounded).unwrap_or(u8::MAX);

    let mut bid = rounded;
    let mut adjustment = None;
    if request.forbidden_bid() == Some(naive_bid) {
        if (bid as f64) < expected_tricks || bid == 0 {
            bid += 1;
            adjustment = Some(BidAdjustment::Raised);
        } else {
            bid -= 1;
            adjustment = Some(BidAdjustment::Lowered);
        }
    }

    BidEstimate {
        bid: u8::try_from(bid.clamp(0, hand_size)).unwrap_or(u8::MAX),
        expected_tricks,
        naive_bid,
        adjustment,
    }
}
