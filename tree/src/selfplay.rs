//! Exhaustive self-play and path-prefix tallies
//!
//! Produces the historical table the probability oracle reads from. Every
//! line of play from a pair of starting hands is enumerated (with no oracle
//! information, so the lines are the same as the tree's), the lines that end
//! in a challenge are kept as outcomes, and each outcome credits its winner
//! on every prefix of its play sequence.

use bluff_engine::config::BuildOptions;
use bluff_engine::error::InputError;
use bluff_engine::node::{Hand, Player, Step, MAX_HAND_CARDS};
use bluff_engine::oracle::{NoInformation, PathKey, PathTable};

use crate::builder::build;

/// One complete line of play.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub start: [Hand; 2],
    /// Every step including the final challenge
    pub history: Vec<Step>,
    pub winner: Player,
}

/// All lines of play from `p1` vs `p2` that end in a challenge within
/// `max_depth` moves. Lines still open at the bound are dropped.
///
/// # Errors
///
/// Returns an error for starting hands the tree builder rejects.
pub fn enumerate_outcomes(p1: Hand, p2: Hand, max_depth: u32) -> Result<Vec<Outcome>, InputError> {
    let tree = build(p1, p2, &NoInformation, &BuildOptions::with_depth(max_depth))?;
    let outcomes: Vec<Outcome> = tree
        .terminals()
        .filter_map(|node| {
            node.resolution().map(|resolution| Outcome {
                start: [p1, p2],
                history: node.history.clone(),
                winner: resolution.winner(),
            })
        })
        .collect();
    log::debug!("{} vs {}: {} outcomes", p1, p2, outcomes.len());
    Ok(outcomes)
}

/// Credit each outcome's winner on every prefix of its play sequence.
///
/// The closing challenge is stripped before prefixes are taken, so keys that
/// end in a challenge never appear in the table.
pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> PathTable {
    let mut table = PathTable::new();
    for outcome in outcomes {
        let plays = match outcome.history.split_last() {
            Some((last, rest)) if last.mv.is_challenge() => rest,
            _ => outcome.history.as_slice(),
        };
        for end in 1..=plays.len() {
            table.record(&PathKey::from_steps(&plays[..end]), outcome.winner);
        }
    }
    table
}

/// Tally every split of a `hand_size`-card hand for both players into one
/// table.
///
/// # Errors
///
/// Returns an error if `hand_size` is zero or larger than the supported
/// maximum.
pub fn tally_starting_hands(hand_size: u8, max_depth: u32) -> Result<PathTable, InputError> {
    if hand_size == 0 {
        return Err(InputError::EmptyOpeningHand);
    }
    if hand_size > MAX_HAND_CARDS {
        let hand = Hand::new(hand_size, 0);
        return Err(InputError::HandTooLarge { player: Player::One, hand });
    }
    let mut table = PathTable::new();
    for k1 in 0..=hand_size {
        for k2 in 0..=hand_size {
            let p1 = Hand::new(k1, hand_size - k1);
            let p2 = Hand::new(k2, hand_size - k2);
            let outcomes = enumerate_outcomes(p1, p2, max_depth)?;
            table.merge(tally(&outcomes));
        }
    }
    log::info!("tallied {} distinct paths for {}-card hands", table.len(), hand_size);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluff_engine::node::Move;
    use bluff_engine::oracle::WinCounts;

    #[test]
    fn test_single_line_game() {
        let outcomes = enumerate_outcomes(Hand::new(1, 0), Hand::new(0, 0), 5).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].winner, Player::One);
        assert_eq!(outcomes[0].history.len(), 2);
        assert!(outcomes[0].history[1].mv.is_challenge());
    }

    #[test]
    fn test_outcomes_all_end_in_challenge() {
        let outcomes = enumerate_outcomes(Hand::new(2, 1), Hand::new(1, 1), 8).unwrap();
        assert!(!outcomes.is_empty());
        for outcome in &outcomes {
            assert_eq!(outcome.history.last().map(|s| s.mv), Some(Move::Challenge));
        }
    }

    #[test]
    fn test_tally_counts_prefixes() {
        let opening = Step::new(Player::One, Move::PlayFake { count: 1 });
        let outcomes = enumerate_outcomes(Hand::new(0, 1), Hand::new(1, 0), 5).unwrap();
        // P2 either calls the bluff (P2 wins) or plays its card and P1 is
        // forced to challenge an honest play (P2 wins again).
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.winner == Player::Two));

        let table = tally(&outcomes);
        assert_eq!(
            table.get(PathKey::from_steps(&[opening]).as_str()),
            Some(WinCounts { p1_wins: 0, p2_wins: 2 })
        );
        assert!(table.get("Player 1 play_fake 1 -> Player 2 challenge").is_none());
        assert_eq!(
            table.get("Player 1 play_fake 1 -> Player 2 play_true 1"),
            Some(WinCounts { p1_wins: 0, p2_wins: 1 })
        );
    }

    #[test]
    fn test_tally_starting_hands() {
        let table = tally_starting_hands(1, 6).unwrap();
        assert!(table.get("Player 1 play_true 1").is_some());
        assert!(table.get("Player 1 play_fake 1").is_some());
        assert!(tally_starting_hands(0, 6).is_err());
        assert!(tally_starting_hands(MAX_HAND_CARDS + 1, 6).is_err());
    }
}
