mod bid;
mod table;

pub use bid::BidPlanner;
pub use table::{SeatBid, bid_round};

use whist_core::bidding::{BidEstimatorConfig, BidRequest, ShortSuitRule};
use whist_core::model::hand::Hand;
use whist_core::model::suit::Trump;

/// Everything a seat can see when it is asked to bid.
#[derive(Debug, Clone, Copy)]
pub struct BidderContext<'a> {
    pub seat: usize,
    pub hand: &'a Hand,
    pub trump: Trump,
    pub prior_bids: &'a [u8],
    pub players: usize,
}

impl<'a> BidderContext<'a> {
    pub fn request(&self) -> BidRequest<'a> {
        BidRequest::new(self.hand, self.trump, self.prior_bids, self.players)
    }

    pub fn is_last_bidder(&self) -> bool {
        self.request().is_last_bidder()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotFeatures {
    bid_details: bool,
    short_suit_rule: Option<ShortSuitRule>,
    damping_weight: Option<f64>,
}

impl BotFeatures {
    pub const fn new(bid_details: bool) -> Self {
        Self {
            bid_details,
            short_suit_rule: None,
            damping_weight: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub const fn bid_details_enabled(self) -> bool {
        self.bid_details
    }

    pub const fn short_suit_rule(self) -> Option<ShortSuitRule> {
        self.short_suit_rule
    }

    pub const fn damping_weight(self) -> Option<f64> {
        self.damping_weight
    }

    pub fn with_bid_details(mut self, enabled: bool) -> Self {
        self.bid_details = enabled;
        self
    }

    /// Applies any overrides on top of `base`.
    pub fn estimator_config(self, base: BidEstimatorConfig) -> BidEstimatorConfig {
        BidEstimatorConfig {
            short_suit_rule: self.short_suit_rule.unwrap_or(base.short_suit_rule),
            damping_weight: self.damping_weight.unwrap_or(base.damping_weight),
        }
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let bid_details = read("WHIST_BID_DETAILS")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        let short_suit_rule =
            read("WHIST_SHORT_SUIT_RULE").and_then(|raw| ShortSuitRule::parse(&raw));

        let damping_weight = read("WHIST_DAMPING_WEIGHT")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=1.0).contains(value));

        Self {
            bid_details,
            short_suit_rule,
            damping_weight,
        }
    }
}

impl Default for BotFeatures {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn bot_features_from_env_default_fallbacks() {
        let features = BotFeatures::from_reader(|_| None);
        assert!(!features.bid_details_enabled());
        assert_eq!(features.short_suit_rule(), None);
        assert_eq!(features.damping_weight(), None);
        assert_eq!(
            features.estimator_config(BidEstimatorConfig::default()),
            BidEstimatorConfig::default()
        );
    }

    #[test]
    fn bot_features_from_env_respects_flags() {
        let mut vars = HashMap::new();
        vars.insert("WHIST_BID_DETAILS", "on");
        vars.insert("WHIST_SHORT_SUIT_RULE", "include");
        vars.insert("WHIST_DAMPING_WEIGHT", "0.45");
        let features = BotFeatures::from_reader(|key| vars.get(key).map(|v| v.to_string()));

        assert!(features.bid_details_enabled());
        let config = features.estimator_config(BidEstimatorConfig::default());
        assert_eq!(config.short_suit_rule, ShortSuitRule::IncludeTrumps);
        assert!((config.damping_weight - 0.45).abs() < f64::EPSILON);
    }

    #[test]
    fn bot_features_ignore_out_of_range_weights() {
        let mut vars = HashMap::new();
        vars.insert("WHIST_DAMPING_WEIGHT", "1.5");
        vars.insert("WHIST_SHORT_SUIT_RULE", "sometimes");
        let features = BotFeatures::from_reader(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(features.damping_weight(), None);
        assert_eq!(features.short_suit_rule(), None);
    }

    #[test]
    fn context_knows_when_it_bids_last() {
        let hand: Hand = "AS KD".parse().expect("valid hand");
        let ctx = BidderContext {
            seat: 2,
            hand: &hand,
            trump: Trump::Spades,
            prior_bids: &[1, 0],
            players: 3,
        };
        assert!(ctx.is_last_bidder());
        assert_eq!(ctx.request().forbidden_bid(), Some(1));
    }
}
