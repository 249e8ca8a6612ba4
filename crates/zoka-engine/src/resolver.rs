//! Round resolution: played cards in, per-player star deltas out.
//!
//! The scoring relation is the six-element counter cycle with two edge
//! rules. For every ordered pair of played cards (a, b) where a's element
//! beats b's, with `Sa`/`Sb` their star values:
//!
//! - `Sb > 2·Sa` — **overpower**: the advantage reverses; b's owner gains
//!   `Sb`, a's owner loses `Sa`.
//! - `Sb == 2·Sa` — **perfect draw**: the pair contributes nothing to
//!   either owner.
//! - `Sb < 2·Sa` — standard: a's owner gains `Sa`, b's owner loses `Sb`.
//!
//! A card may sit in several pairs at once (countering one element while
//! being countered by another); every contribution sums. Cards whose
//! element has no counter partner present at all fall back to the neutral
//! rule: strictly highest stars gain, everyone else in that subset loses,
//! and a tie at the top is a wash.

use zoka_protocol::{Element, PlayerId};

/// One player's committed card for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Play {
    pub player: PlayerId,
    pub element: Element,
    pub stars: u32,
}

/// Computes each player's star delta for one round.
///
/// Returns deltas in the same order as `plays`. Pure: no state, no
/// clamping — the room applies the floor when it updates totals.
pub fn resolve_round(plays: &[Play]) -> Vec<i64> {
    let mut changes = vec![0i64; plays.len()];
    // Whether each card took part in at least one counter pair (a
    // perfect draw still counts as taking part).
    let mut in_a_pair = vec![false; plays.len()];

    for i in 0..plays.len() {
        for j in 0..plays.len() {
            if i == j || plays[i].element.beats() != plays[j].element {
                continue;
            }
            in_a_pair[i] = true;
            in_a_pair[j] = true;

            let sa = i64::from(plays[i].stars);
            let sb = i64::from(plays[j].stars);
            if sb > 2 * sa {
                // Overpower: the disadvantaged card wins the exchange.
                changes[j] += sb;
                changes[i] -= sa;
            } else if sb < 2 * sa {
                changes[i] += sa;
                changes[j] -= sb;
            }
            // sb == 2 * sa: perfect draw, no contribution.
        }
    }

    neutral_fallback(plays, &in_a_pair, &mut changes);
    changes
}

/// Applies the neutral rule to every card that ended up in no pair.
fn neutral_fallback(plays: &[Play], in_a_pair: &[bool], changes: &mut [i64]) {
    let neutral: Vec<usize> = (0..plays.len()).filter(|&i| !in_a_pair[i]).collect();
    if neutral.is_empty() {
        return;
    }

    let top = neutral
        .iter()
        .map(|&i| plays[i].stars)
        .max()
        .unwrap_or_default();
    let top_count = neutral.iter().filter(|&&i| plays[i].stars == top).count();

    for &i in &neutral {
        let stars = i64::from(plays[i].stars);
        if plays[i].stars == top {
            if top_count == 1 {
                changes[i] += stars;
            }
            // Tied at the maximum: draw, no change.
        } else {
            changes[i] -= stars;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(id: u64, element: Element, stars: u32) -> Play {
        Play {
            player: PlayerId(id),
            element,
            stars,
        }
    }

    #[test]
    fn test_standard_counter() {
        // Fire 5 beats Ice 3: +5 / -3.
        let plays = [play(1, Element::Fire, 5), play(2, Element::Ice, 3)];
        assert_eq!(resolve_round(&plays), vec![5, -3]);
    }

    #[test]
    fn test_overpower_reverses_outcome() {
        // Ice 7 > 2×Fire 3: Ice wins +7, Fire loses -3.
        let plays = [play(1, Element::Fire, 3), play(2, Element::Ice, 7)];
        assert_eq!(resolve_round(&plays), vec![-3, 7]);
    }

    #[test]
    fn test_perfect_draw_contributes_nothing() {
        // Ice 6 == 2×Fire 3: neither side moves.
        let plays = [play(1, Element::Fire, 3), play(2, Element::Ice, 6)];
        assert_eq!(resolve_round(&plays), vec![0, 0]);
    }

    #[test]
    fn test_perfect_draw_law_holds_for_all_star_values() {
        for sa in 1..=10u32 {
            let plays = [play(1, Element::Wind, sa), play(2, Element::Earth, 2 * sa)];
            assert_eq!(resolve_round(&plays), vec![0, 0], "sa = {sa}");
        }
    }

    #[test]
    fn test_overpower_law_holds_beyond_double() {
        for sa in 1..=5u32 {
            let sb = 2 * sa + 1;
            let plays = [play(1, Element::Water, sa), play(2, Element::Fire, sb)];
            assert_eq!(
                resolve_round(&plays),
                vec![-i64::from(sa), i64::from(sb)],
                "sa = {sa}"
            );
        }
    }

    #[test]
    fn test_four_element_worked_scenario() {
        // A(Fire,5) B(Ice,3) C(Wind,2) D(Earth,4):
        // Fire→Ice standard (+5/-3), Ice→Wind standard (+3/-2),
        // Wind→Earth perfect draw, Earth's target absent.
        let plays = [
            play(1, Element::Fire, 5),
            play(2, Element::Ice, 3),
            play(3, Element::Wind, 2),
            play(4, Element::Earth, 4),
        ];
        assert_eq!(resolve_round(&plays), vec![5, -3 + 3, -2, 0]);
    }

    #[test]
    fn test_middle_element_sums_both_relations() {
        // Ice 4 beats Wind 2 (+4/-2) and is beaten by Fire 5 (+5/-4):
        // Ice nets -4 + 4 = 0.
        let plays = [
            play(1, Element::Fire, 5),
            play(2, Element::Ice, 4),
            play(3, Element::Wind, 2),
        ];
        assert_eq!(resolve_round(&plays), vec![5, 0, -2]);
    }

    #[test]
    fn test_duplicate_elements_pair_per_card() {
        // Two Fire cards each beat the one Ice card; Ice pays both.
        let plays = [
            play(1, Element::Fire, 3),
            play(2, Element::Fire, 4),
            play(3, Element::Ice, 1),
        ];
        assert_eq!(resolve_round(&plays), vec![3, 4, -1 - 1]);
    }

    #[test]
    fn test_neutral_fallback_highest_wins() {
        // Fire and Earth share no relation: higher stars win, lower lose.
        let plays = [play(1, Element::Fire, 6), play(2, Element::Earth, 2)];
        assert_eq!(resolve_round(&plays), vec![6, -2]);
    }

    #[test]
    fn test_neutral_fallback_tie_is_a_wash() {
        let plays = [
            play(1, Element::Fire, 4),
            play(2, Element::Earth, 4),
            play(3, Element::Fire, 2),
        ];
        // Same-element Fire cards have no pair either; both 4s tie at the
        // top, the 2 loses.
        assert_eq!(resolve_round(&plays), vec![0, 0, -2]);
    }

    #[test]
    fn test_neutral_singleton_gains_its_stars() {
        let plays = [play(1, Element::Electric, 7)];
        assert_eq!(resolve_round(&plays), vec![7]);
    }

    #[test]
    fn test_perfect_draw_still_counts_as_a_pair() {
        // Wind 2 vs Earth 4 is a perfect draw; Earth must NOT fall into
        // the neutral subset alongside the lone Electric card.
        let plays = [
            play(1, Element::Wind, 2),
            play(2, Element::Earth, 4),
            play(3, Element::Water, 9),
        ];
        // Water is neutral and alone: +9. Wind/Earth: 0 each.
        assert_eq!(resolve_round(&plays), vec![0, 0, 9]);
    }

    #[test]
    fn test_empty_round_is_empty() {
        assert!(resolve_round(&[]).is_empty());
    }
}
