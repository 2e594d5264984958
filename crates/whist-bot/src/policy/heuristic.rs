use super::Bidder;
use crate::bot::{BidPlanner, BidderContext, BotFeatures};
use whist_core::bidding::{BidError, BidEstimate, BidEstimator, BidEstimatorConfig};

/// Adapter that wraps the trick estimator to implement the Bidder trait
#[derive(Debug, Clone)]
pub struct HeuristicBidder {
    name: String,
    estimator: BidEstimator,
    features: BotFeatures,
}

impl HeuristicBidder {
    pub fn new(name: impl Into<String>, config: BidEstimatorConfig, features: BotFeatures) -> Self {
        Self {
            name: name.into(),
            estimator: BidEstimator::new(features.estimator_config(config)),
            features,
        }
    }

    /// Default estimator, with overrides read from the environment.
    pub fn from_env() -> Self {
        Self::new(
            "heuristic",
            BidEstimatorConfig::default(),
            BotFeatures::from_env(),
        )
    }

    pub fn config(&self) -> BidEstimatorConfig {
        self.estimator.config()
    }
}

impl Default for HeuristicBidder {
    fn default() -> Self {
        Self::new(
            "heuristic",
            BidEstimatorConfig::default(),
            BotFeatures::default(),
        )
    }
}

impl Bidder for HeuristicBidder {
    fn choose_bid(&mut self, ctx: &BidderContext<'_>) -> Result<BidEstimate, BidError> {
        BidPlanner::choose(ctx, &self.estimator, self.features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
