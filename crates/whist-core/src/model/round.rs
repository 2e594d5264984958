use crate::bidding::constants::{CARDS_IN_PACK, CARDS_IN_SUIT};
use crate::model::suit::Trump;
use serde::{Deserialize, Serialize};

/// Largest hand that can be dealt to every seat at a table of `players`.
pub const fn max_cards_for(players: usize) -> usize {
    if players == 0 {
        return 0;
    }
    let per_player = CARDS_IN_PACK / players;
    if per_player > CARDS_IN_SUIT {
        CARDS_IN_SUIT
    } else {
        per_player
    }
}

/// One round of a game: how many cards each player holds and what is trumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub number: usize,
    pub hand_size: usize,
    pub trump: Trump,
}

/// Sequence of rounds played in a game.
///
/// Hand sizes count down from `max_cards` to `min_cards`, then back up again
/// when `bounce` is set. Trumps rotate clubs, diamonds, hearts, spades and
/// optionally no-trump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSchedule {
    pub max_cards: usize,
    pub min_cards: usize,
    pub bounce: bool,
    pub include_no_trump: bool,
}

impl RoundSchedule {
    pub fn standard(players: usize) -> Self {
        Self {
            max_cards: max_cards_for(players),
            min_cards: 1,
            bounce: false,
            include_no_trump: false,
        }
    }

    pub fn rounds(&self) -> Vec<RoundSpec> {
        if self.max_cards == 0 || self.min_cards == 0 || self.min_cards > self.max_cards {
            return Vec::new();
        }
        let mut sizes: Vec<usize> = (self.min_cards..=self.max_cards).rev().collect();
        if self.bounce {
            sizes.extend(self.min_cards + 1..=self.max_cards);
        }
        let trumps: &[Trump] = if self.include_no_trump {
            &Trump::ROTATION
        } else {
            &Trump::ROTATION[..4]
        };
        sizes
            .into_iter()
            .enumerate()
            .map(|(index, hand_size)| RoundSpec {
                number: index + 1,
                hand_size,
                trump: trumps[index % trumps.len()],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_cards_caps_at_suit_size() {
        assert_eq!(max_cards_for(3), 13);
        assert_eq!(max_cards_for(4), 13);
        assert_eq!(max_cards_for(5), 10);
        assert_eq!(max_cards_for(2), 13);
        assert_eq!(max_cards_for(0), 0);
    }

    #[test]
    fn standard_schedule_counts_down_with_rotating_trumps() {
        let rounds = RoundSchedule::standard(4).rounds();
        assert_eq!(rounds.len(), 13);
        assert_eq!(rounds[0].hand_size, 13);
        assert_eq!(rounds[0].trump, Trump::Clubs);
        assert_eq!(rounds[3].trump, Trump::Spades);
        assert_eq!(rounds[4].trump, Trump::Clubs);
        assert_eq!(rounds[12].hand_size, 1);
        assert!(rounds.iter().all(|round| !round.trump.is_no_trump()));
    }

    #[test]
    fn bounce_schedule_returns_to_max() {
        let schedule = RoundSchedule {
            max_cards: 3,
            min_cards: 1,
            bounce: true,
            include_no_trump: true,
        };
        let sizes: Vec<_> = schedule.rounds().iter().map(|r| r.hand_size).collect();
        assert_eq!(sizes, vec![3, 2, 1, 2, 3]);
        assert_eq!(schedule.rounds()[4].trump, Trump::NoTrump);
    }

    #[test]
    fn invalid_bounds_produce_no_rounds() {
        let schedule = RoundSchedule {
            max_cards: 2,
            min_cards: 3,
            bounce: false,
            include_no_trump: false,
        };
        assert!(schedule.rounds().is_empty());
    }
}
