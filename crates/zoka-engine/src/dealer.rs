//! Hand dealing at match start.

use rand::Rng;

use zoka_protocol::{Card, CardId, Element};

use crate::GameConfig;

/// Deals starting hands: one card per round, element uniform over the
/// six, stars uniform over the configured range.
///
/// Generic over [`Rng`] so the room actor can use the thread-local rng
/// while tests inject a seeded `StdRng` for reproducible hands.
#[derive(Debug, Clone)]
pub struct HandDealer {
    hand_size: u32,
    star_range: std::ops::RangeInclusive<u32>,
}

impl HandDealer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            hand_size: config.rounds,
            star_range: config.star_range.clone(),
        }
    }

    /// Deals a full hand, drawing card ids from `next_card_id`.
    ///
    /// Ids are unique per room as long as the caller threads the same
    /// counter through every deal.
    pub fn deal<R: Rng + ?Sized>(&self, rng: &mut R, next_card_id: &mut u64) -> Vec<Card> {
        (0..self.hand_size)
            .map(|_| {
                let id = CardId(*next_card_id);
                *next_card_id += 1;
                Card {
                    id,
                    element: Element::ALL[rng.random_range(0..Element::ALL.len())],
                    stars: rng.random_range(self.star_range.clone()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dealer() -> HandDealer {
        HandDealer::new(&GameConfig::default())
    }

    #[test]
    fn test_deals_one_card_per_round() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut next_id = 0;
        let hand = dealer().deal(&mut rng, &mut next_id);
        assert_eq!(hand.len(), 10);
    }

    #[test]
    fn test_stars_stay_in_configured_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut next_id = 0;
        for _ in 0..50 {
            for card in dealer().deal(&mut rng, &mut next_id) {
                assert!((1..=10).contains(&card.stars));
            }
        }
    }

    #[test]
    fn test_card_ids_are_unique_across_deals() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut next_id = 0;
        let d = dealer();
        let first = d.deal(&mut rng, &mut next_id);
        let second = d.deal(&mut rng, &mut next_id);
        let mut ids: Vec<_> = first.iter().chain(&second).map(|c| c.id).collect();
        ids.sort_by_key(|id| id.0);
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_all_elements_show_up_eventually() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut next_id = 0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            for card in dealer().deal(&mut rng, &mut next_id) {
                seen.insert(card.element);
            }
        }
        assert_eq!(seen.len(), Element::ALL.len());
    }

    #[test]
    fn test_custom_star_range_is_respected() {
        let config = GameConfig {
            star_range: 5..=5,
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut next_id = 0;
        let hand = HandDealer::new(&config).deal(&mut rng, &mut next_id);
        assert!(hand.iter().all(|c| c.stars == 5));
    }
}
