use proptest::prelude::*;
use whist_core::bidding::{
    BidAdjustment, BidEstimator, BidEstimatorConfig, BidRequest, ShortSuitRule, estimate_bid,
};
use whist_core::model::deck::Deck;
use whist_core::model::hand::Hand;
use whist_core::model::round::max_cards_for;
use whist_core::model::card::Card;
use whist_core::model::rank::Rank;
use whist_core::model::suit::{Suit, Trump};

fn hand(cards: &str) -> Hand {
    cards.parse().expect("valid hand")
}

fn dealt_hand(seed: u64, players: usize, hand_size: usize) -> Hand {
    let deck = Deck::shuffled_with_seed(seed);
    let mut hands = deck.deal(players, hand_size).expect("deal fits the pack");
    hands.swap_remove(0)
}

fn suit_winners(estimator: &BidEstimator, hand: &Hand, trump: Trump, players: usize, suit: Suit) -> f64 {
    let request = BidRequest::new(hand, trump, &[], players);
    estimator
        .explain(&request)
        .expect("valid request")
        .suits
        .iter()
        .find(|entry| entry.suit == suit)
        .map(|entry| entry.winners)
        .unwrap_or(0.0)
}

fn assert_explained_in_range(hand: &Hand, trump: Trump, players: usize) {
    let request = BidRequest::new(hand, trump, &[], players);
    let explanation = BidEstimator::default()
        .explain(&request)
        .expect("valid request");
    assert!(usize::from(explanation.estimate.bid) <= hand.len());
    assert!(explanation.estimate.expected_tricks.is_finite());
    assert_eq!(explanation.cards().count(), hand.len());
    for entry in explanation.cards() {
        assert!(
            entry.probability.is_finite()
                && entry.probability >= 0.0
                && entry.probability <= 1.0 + 1e-12,
            "{} at {trump} with {players} players scored {}",
            entry.card,
            entry.probability
        );
    }
}

#[test]
fn top_spades_and_a_low_club_bid_two() {
    let bid = estimate_bid(&hand("AS KS 2C"), Trump::Spades, &[], 4).expect("valid");
    assert_eq!(bid, 2);
}

#[test]
fn regression_baseline_for_top_spades() {
    let hand = hand("AS KS 2C");
    let request = BidRequest::new(&hand, Trump::Spades, &[], 4);
    let estimate = BidEstimator::default().estimate(&request).expect("valid");
    assert!((estimate.expected_tricks - 2.021_731_754_657_096).abs() < 1e-9);
}

#[test]
fn all_aces_at_no_trump_bid_the_whole_hand() {
    let bid = estimate_bid(&hand("AC AD AH AS"), Trump::NoTrump, &[], 4).expect("valid");
    assert_eq!(bid, 4);
}

#[test]
fn whole_trump_suit_takes_every_trick() {
    let spades = hand("AS KS QS JS 10S 9S 8S 7S 6S 5S 4S 3S 2S");
    assert_eq!(estimate_bid(&spades, Trump::Spades, &[], 4), Ok(13));
}

#[test]
fn low_cards_against_many_opponents_bid_nothing() {
    let low = hand("2C 3C 4D 5D 2H 3S 4S 5H");
    let request = BidRequest::new(&low, Trump::NoTrump, &[], 6);
    let estimate = BidEstimator::default().estimate(&request).expect("valid");
    assert_eq!(estimate.bid, 0);
    assert!(estimate.expected_tricks < 0.01);
}

#[test]
fn last_bidder_steers_away_from_the_trick_count() {
    let hand = hand("AS KS 2C");
    let naive = estimate_bid(&hand, Trump::Spades, &[], 4).expect("valid");
    // Three earlier bids leave exactly `naive` tricks for the last bidder.
    let remaining = 3 - naive;
    let prior = [remaining, 0, 0];
    let request = BidRequest::new(&hand, Trump::Spades, &prior, 4);
    let estimate = BidEstimator::default().estimate(&request).expect("valid");
    assert_ne!(estimate.bid, naive);
    assert_eq!(estimate.adjustment, Some(BidAdjustment::Raised));
    assert_eq!(estimate.bid, naive + 1);
}

#[test]
fn two_player_full_deal_stays_in_range() {
    for seed in 0..8 {
        let hand = dealt_hand(seed, 2, 26);
        for trump in Trump::ROTATION {
            let bid = estimate_bid(&hand, trump, &[], 2).expect("valid");
            assert!(usize::from(bid) <= 26);
        }
    }
}

#[test]
fn four_player_thirteen_card_deal_stays_in_range() {
    for seed in 0..4 {
        let hand = dealt_hand(seed, 4, 13);
        let bid = estimate_bid(&hand, Trump::Hearts, &[3, 4, 2], 4).expect("valid");
        assert!(usize::from(bid) <= 13);
        assert_ne!(bid, 4, "last bidder must not make the total 13");
    }
}

#[test]
fn full_trump_suit_scores_nothing_when_trumps_are_not_exempt() {
    let estimator = BidEstimator::new(BidEstimatorConfig {
        short_suit_rule: ShortSuitRule::IncludeTrumps,
        ..BidEstimatorConfig::default()
    });
    let spades = hand("AS KS QS JS 10S 9S 8S 7S 6S 5S 4S 3S 2S");
    let request = BidRequest::new(&spades, Trump::Spades, &[], 4);
    assert_eq!(estimator.estimate(&request).expect("valid").bid, 0);
}

#[test]
fn five_player_maximum_deal_stays_in_range() {
    for seed in 0..6 {
        let hand = dealt_hand(seed, 5, 10);
        for trump in Trump::ROTATION {
            assert_explained_in_range(&hand, trump, 5);
        }
    }
}

#[test]
fn six_player_maximum_deal_stays_in_range() {
    for seed in 0..6 {
        let hand = dealt_hand(seed, 6, 8);
        for trump in Trump::ROTATION {
            assert_explained_in_range(&hand, trump, 6);
        }
    }
}

#[test]
fn two_player_full_deal_at_no_trump_explains_every_card() {
    for seed in 0..4 {
        assert_explained_in_range(&dealt_hand(seed, 2, 26), Trump::NoTrump, 2);
    }

    // Opponent holds every other card, so two solid suits win outright.
    let solid = hand(
        "AS KS QS JS 10S 9S 8S 7S 6S 5S 4S 3S 2S AH KH QH JH 10H 9H 8H 7H 6H 5H 4H 3H 2C",
    );
    let request = BidRequest::new(&solid, Trump::NoTrump, &[], 2);
    let explanation = BidEstimator::default().explain(&request).expect("valid");
    assert_eq!(explanation.estimate.bid, 25);
    let low_club = explanation
        .card(Card::new(Rank::Two, Suit::Clubs))
        .expect("2C explained");
    assert_eq!(low_club.gap_above, 12);
    assert!(low_club.probability.abs() < 1e-12);
}

proptest! {
    #[test]
    fn bid_is_within_hand_size(
        seed in any::<u64>(),
        players in 2usize..=6,
        size_fraction in 0.0f64..1.0,
        trump_index in 0usize..5,
        prior_seed in any::<u64>(),
    ) {
        let max = max_cards_for(players);
        let hand_size = 1 + ((max - 1) as f64 * size_fraction) as usize;
        let hand = dealt_hand(seed, players, hand_size);
        let trump = Trump::ROTATION[trump_index];
        let prior_count = (prior_seed % players as u64) as usize;
        let prior: Vec<u8> = (0..prior_count)
            .map(|i| ((prior_seed >> (i * 4)) % (hand_size as u64 + 1)) as u8)
            .collect();

        let bid = estimate_bid(&hand, trump, &prior, players).expect("valid request");
        prop_assert!(usize::from(bid) <= hand_size);
    }

    #[test]
    fn estimates_are_repeatable(seed in any::<u64>(), players in 3usize..=5) {
        let hand = dealt_hand(seed, players, 7);
        let request = BidRequest::new(&hand, Trump::Diamonds, &[], players);
        let estimator = BidEstimator::default();
        let first = estimator.estimate(&request).expect("valid");
        let second = estimator.estimate(&request).expect("valid");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn covered_trumps_never_lower_a_suits_winners(
        seed in any::<u64>(),
        players in 2usize..=5,
        hand_size in 1usize..=10,
    ) {
        let hand = dealt_hand(seed, players, hand_size);
        let covered = BidEstimator::new(BidEstimatorConfig {
            short_suit_rule: ShortSuitRule::CoveredTrumps,
            ..BidEstimatorConfig::default()
        });
        let as_trumps = suit_winners(&covered, &hand, Trump::Spades, players, Suit::Spades);
        let as_side_suit = suit_winners(&covered, &hand, Trump::Diamonds, players, Suit::Spades);
        prop_assert!(as_trumps + 1e-12 >= as_side_suit);
    }
}
