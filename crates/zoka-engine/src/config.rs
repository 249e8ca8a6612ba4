//! Game configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Fixed parameters of a Zoka match, plus the tuning knobs.
///
/// The defaults are the production rules; tests shrink `rounds` or the
/// star range where convenient.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Minimum players required before the host can start.
    pub min_players: usize,

    /// Allowed range for a room's `max_players` at creation.
    pub max_players_range: RangeInclusive<usize>,

    /// Rounds per match; also the hand size, one card per round.
    pub rounds: u32,

    /// Every player's star total at match start.
    pub starting_stars: i64,

    /// How long the active player has before their lowest card is
    /// auto-played.
    pub turn_timeout: Duration,

    /// Star values dealt onto cards, inclusive.
    pub star_range: RangeInclusive<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players_range: 4..=100,
            rounds: 10,
            starting_stars: 55,
            turn_timeout: Duration::from_secs(20),
            star_range: 1..=10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_game_rules() {
        let config = GameConfig::default();
        assert_eq!(config.min_players, 4);
        assert_eq!(config.max_players_range, 4..=100);
        assert_eq!(config.rounds, 10);
        assert_eq!(config.starting_stars, 55);
        assert_eq!(config.turn_timeout, Duration::from_secs(20));
    }
}
