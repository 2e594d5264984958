use crate::bidding::constants::{CARDS_IN_PACK, CARDS_IN_SUIT};
use crate::model::card::Card;
use crate::model::suit::{Suit, Trump};
use serde::{Deserialize, Serialize};

/// Which suits carry the risk of an opponent running out and ruffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSuitRule {
    /// Our own trumps cannot be ruffed, so only side suits are at risk.
    #[default]
    #[serde(alias = "exempt")]
    ExemptTrumps,
    /// Every suit is at risk whenever a trump suit exists.
    #[serde(alias = "include")]
    IncludeTrumps,
    /// Like `ExemptTrumps`, but an opponent's higher trump is also weighed by
    /// the trump length behind it, as side-suit cards are. A suit then never
    /// scores fewer winners as trumps than as a side suit.
    #[serde(alias = "covered")]
    CoveredTrumps,
}

impl ShortSuitRule {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exempt" | "exempt_trumps" | "exempt-trumps" => Some(ShortSuitRule::ExemptTrumps),
            "include" | "include_trumps" | "include-trumps" => Some(ShortSuitRule::IncludeTrumps),
            "covered" | "covered_trumps" | "covered-trumps" => Some(ShortSuitRule::CoveredTrumps),
            _ => None,
        }
    }
}

/// Probability model for one player's view of the table.
///
/// Every opponent is assumed to hold `hand_size` cards drawn uniformly from
/// the cards this player cannot see.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableOdds {
    pub players: usize,
    pub hand_size: usize,
    pub trump: Trump,
    pub rule: ShortSuitRule,
    pub damping_weight: f64,
}

impl TableOdds {
    pub fn opponents(&self) -> usize {
        self.players.saturating_sub(1)
    }

    pub fn unseen(&self) -> usize {
        CARDS_IN_PACK.saturating_sub(self.hand_size)
    }

    /// Whether an opponent who runs out of `suit` could ruff our top card.
    fn ruff_risk(&self, suit: Suit) -> bool {
        match self.trump.suit() {
            None => false,
            Some(trump) if trump == suit => self.rule == ShortSuitRule::IncludeTrumps,
            Some(_) => true,
        }
    }

    /// Whether a higher card of `suit` held by an opponent is weighed by the
    /// suit length behind it.
    fn length_matters(&self, suit: Suit) -> bool {
        match self.trump.suit() {
            None => false,
            Some(trump) if trump == suit => self.rule == ShortSuitRule::CoveredTrumps,
            Some(_) => true,
        }
    }

    /// Probability that a single opponent, with `reduced_by` of their cards
    /// already accounted for, still holds `cards` of a suit this player holds
    /// `own_in_suit` of.
    ///
    /// Taken as one minus the chance that the opponent's remaining slots are
    /// filled from the other suits alone, multiplied out one draw at a time.
    /// A requirement beyond the remaining slots counts as met.
    pub fn holds_at_least(&self, cards: usize, own_in_suit: usize, reduced_by: usize) -> f64 {
        if cards == 0 {
            return 1.0;
        }
        let slots = self.hand_size.saturating_sub(reduced_by);
        if cards > slots {
            return 1.0;
        }
        let pool = self.unseen().saturating_sub(reduced_by);
        if pool == 0 {
            return 0.0;
        }
        let suit_left = CARDS_IN_SUIT
            .saturating_sub(own_in_suit)
            .saturating_sub(reduced_by);
        let other_left = pool.saturating_sub(suit_left);

        let mut void = 1.0;
        for drawn in 0..slots {
            if drawn >= other_left {
                return 1.0;
            }
            void *= (other_left - drawn) as f64 / (pool - drawn) as f64;
        }
        (1.0 - void).clamp(0.0, 1.0)
    }

    /// Probability that every opponent still follows `suit` on the
    /// `cover_required`-th round of it. Always 1 when none of them could ruff.
    pub fn opponents_follow(&self, cover_required: usize, suit: Suit, own_in_suit: usize) -> f64 {
        if !self.ruff_risk(suit) {
            return 1.0;
        }
        let opponents = i32::try_from(self.opponents()).unwrap_or(i32::MAX);
        self.holds_at_least(cover_required, own_in_suit, 0)
            .powi(opponents)
    }

    /// Probability that the card of `suit` at `higher_rank` sits in an
    /// opponent's hand with enough length behind it to be played as a threat.
    pub fn card_in_play_protected(&self, higher_rank: u8, suit: Suit, own_in_suit: usize) -> f64 {
        let unseen = self.unseen();
        if unseen == 0 {
            return 0.0;
        }
        let dealt = (self.opponents() * self.hand_size) as f64;
        let share = (dealt / unseen as f64).min(1.0);
        if !self.length_matters(suit) {
            return share;
        }
        let above = CARDS_IN_SUIT.saturating_sub(usize::from(higher_rank));
        share * self.holds_at_least(above, own_in_suit, 1)
    }

    /// Chance that `card` wins a trick, given `gap_above` unseen higher
    /// cards and the suit length `cover_required` needed to keep it until
    /// they are gone.
    pub fn winner_probability(
        &self,
        gap_above: usize,
        cover_required: usize,
        card: Card,
        own_in_suit: usize,
    ) -> f64 {
        if gap_above == 0 {
            if own_in_suit < cover_required {
                return 0.0;
            }
            return self.opponents_follow(cover_required, card.suit, own_in_suit);
        }

        let higher_rank = card.rank.value().saturating_add(gap_above as u8);
        let in_play = self
            .card_in_play_protected(higher_rank, card.suit, own_in_suit)
            .clamp(0.0, 1.0);
        let still_covered =
            self.winner_probability(gap_above - 1, cover_required, card, own_in_suit);
        let released = self.winner_probability(
            gap_above - 1,
            cover_required.saturating_sub(1),
            card,
            own_in_suit,
        );
        in_play * self.damping_weight * still_covered + (1.0 - in_play) * released
    }
}
