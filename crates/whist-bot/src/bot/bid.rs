use super::{BidderContext, BotFeatures};
use tracing::{Level, event};
use whist_core::bidding::{BidError, BidEstimate, BidEstimator, BidExplanation};

pub struct BidPlanner;

impl BidPlanner {
    pub fn choose(
        ctx: &BidderContext<'_>,
        estimator: &BidEstimator,
        features: BotFeatures,
    ) -> Result<BidEstimate, BidError> {
        let request = ctx.request();
        let estimate = if features.bid_details_enabled() && tracing::enabled!(Level::DEBUG) {
            let explanation = estimator.explain(&request)?;
            log_card_details(ctx, &explanation);
            explanation.estimate
        } else {
            estimator.estimate(&request)?
        };
        log_bid_decision(ctx, estimator, &estimate);
        Ok(estimate)
    }
}

fn log_bid_decision(ctx: &BidderContext<'_>, estimator: &BidEstimator, estimate: &BidEstimate) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let config = estimator.config();
    let adjustment = estimate
        .adjustment
        .map(|direction| format!("{direction:?}"))
        .unwrap_or_default();

    event!(
        target: "whist_bot::bid",
        Level::INFO,
        seat = ctx.seat,
        players = ctx.players,
        trump = %ctx.trump,
        hand_size = ctx.hand.len(),
        prior_bids = ?ctx.prior_bids,
        last_bidder = ctx.is_last_bidder(),
        expected_tricks = estimate.expected_tricks,
        naive_bid = estimate.naive_bid,
        bid = estimate.bid,
        adjustment = %adjustment,
        short_suit_rule = ?config.short_suit_rule,
        damping_weight = config.damping_weight,
    );
}

fn log_card_details(ctx: &BidderContext<'_>, explanation: &BidExplanation) {
    for suit in &explanation.suits {
        for card in &suit.cards {
            event!(
                target: "whist_bot::bid_detail",
                Level::DEBUG,
                seat = ctx.seat,
                card = %card.card,
                is_trump = suit.is_trump,
                gap_above = card.gap_above,
                cover_required = card.cover_required,
                probability = card.probability,
                suit_winners = suit.winners,
            );
        }
    }
}
