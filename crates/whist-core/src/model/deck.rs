use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Deals `hand_size` cards to each of `players` seats, one at a time.
    /// Returns `None` when the pack cannot cover the deal.
    pub fn deal(&self, players: usize, hand_size: usize) -> Option<Vec<Hand>> {
        if players == 0 || players * hand_size > self.cards.len() {
            return None;
        }
        let mut hands = vec![Vec::with_capacity(hand_size); players];
        for (index, card) in self.cards.iter().take(players * hand_size).enumerate() {
            hands[index % players].push(*card);
        }
        Some(hands.into_iter().map(Hand::with_cards).collect())
    }
}
