//! Legal move generation
//!
//! Moves are produced in a fixed order: every `PlayTrue` by ascending count,
//! then every `PlayFake` by ascending count, then `Challenge` unless this is
//! the opening move of the game. Tree children, solver tie-breaks and
//! cross-tree matching all inherit this order.

use crate::node::{Hand, Move, Player, Step};

/// All legal moves for `player` holding `hand`.
///
/// Returns an empty vector only for an exhausted hand on the opening move;
/// an exhausted hand later in the game yields just the challenge, and the
/// tree builder turns that into a forced challenge.
pub fn legal_moves(player: Player, hand: Hand, opening: bool) -> Vec<Step> {
    let mut moves = Vec::with_capacity(hand.total() as usize + 1);
    moves.extend((1..=hand.truths).map(|count| Step::new(player, Move::PlayTrue { count })));
    moves.extend((1..=hand.fakes).map(|count| Step::new(player, Move::PlayFake { count })));
    if !opening {
        moves.push(Step::new(player, Move::Challenge));
    }
    moves
}
