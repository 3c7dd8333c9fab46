//! Node definitions for the game tree
//!
//! This module defines the static vocabulary of the bluffing game (players,
//! hands, moves, payoffs) and the arena that stores explored positions.
//! Nodes are immutable once built and separate from solver state, which lives
//! in parallel arrays indexed by `NodeId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Largest hand total accepted as a starting hand.
///
/// Trees grow combinatorially in the hand size; beyond this bound exhaustive
/// enumeration is not supported.
pub const MAX_HAND_CARDS: u8 = 10;

/// Reward paid to the winner of a resolved challenge (the loser pays the same).
pub const CHALLENGE_REWARD: f64 = 3.0;

/// One of the two seats. Player one always opens the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the opponent of this player
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Zero-based index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Seat number as printed in path keys (1 or 2)
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A player's remaining cards: genuine ("true") and bluff ("fake").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hand {
    pub truths: u8,
    pub fakes: u8,
}

impl Hand {
    pub fn new(truths: u8, fakes: u8) -> Self {
        Hand { truths, fakes }
    }

    /// Total cards left in hand
    pub fn total(self) -> u16 {
        self.truths as u16 + self.fakes as u16
    }

    /// True when no card is left to commit
    pub fn is_exhausted(self) -> bool {
        self.total() == 0
    }

    /// The hand that remains after committing `mv`.
    ///
    /// Returns `None` if the move commits more cards than the hand holds.
    /// A challenge commits nothing and leaves the hand unchanged.
    pub fn after(self, mv: Move) -> Option<Hand> {
        match mv {
            Move::PlayTrue { count } if count >= 1 => self
                .truths
                .checked_sub(count)
                .map(|truths| Hand { truths, ..self }),
            Move::PlayFake { count } if count >= 1 => self
                .fakes
                .checked_sub(count)
                .map(|fakes| Hand { fakes, ..self }),
            Move::Challenge => Some(self),
            _ => None,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.truths, self.fakes)
    }
}

/// An action, independent of who takes it.
///
/// Equality is structural (variant and count), which is what cross-tree move
/// matching relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Commit `count` genuine cards
    PlayTrue { count: u8 },
    /// Commit `count` bluff cards
    PlayFake { count: u8 },
    /// Challenge the opponent's last commitment
    Challenge,
}

impl Move {
    /// Name used in oracle path keys
    pub fn kind(self) -> &'static str {
        match self {
            Move::PlayTrue { .. } => "play_true",
            Move::PlayFake { .. } => "play_fake",
            Move::Challenge => "challenge",
        }
    }

    pub fn count(self) -> Option<u8> {
        match self {
            Move::PlayTrue { count } | Move::PlayFake { count } => Some(count),
            Move::Challenge => None,
        }
    }

    pub fn is_challenge(self) -> bool {
        matches!(self, Move::Challenge)
    }

    pub fn is_bluff(self) -> bool {
        matches!(self, Move::PlayFake { .. })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count() {
            Some(count) => write!(f, "{} {}", self.kind(), count),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// A move together with the player who made it (one history entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub player: Player,
    pub mv: Move,
}

impl Step {
    pub fn new(player: Player, mv: Move) -> Self {
        Step { player, mv }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {} {}", self.player, self.mv)
    }
}

/// Payoff pair, indexed by `Player`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Payoff {
    pub p1: f64,
    pub p2: f64,
}

impl Payoff {
    pub const ZERO: Payoff = Payoff { p1: 0.0, p2: 0.0 };

    pub fn new(p1: f64, p2: f64) -> Self {
        Payoff { p1, p2 }
    }

    /// Value for one player
    pub fn of(self, player: Player) -> f64 {
        match player {
            Player::One => self.p1,
            Player::Two => self.p2,
        }
    }

    /// Zero-sum reward of `magnitude` oriented toward `winner`
    pub fn win_for(winner: Player, magnitude: f64) -> Self {
        match winner {
            Player::One => Payoff::new(magnitude, -magnitude),
            Player::Two => Payoff::new(-magnitude, magnitude),
        }
    }
}

impl Add for Payoff {
    type Output = Payoff;

    fn add(self, rhs: Payoff) -> Payoff {
        Payoff::new(self.p1 + rhs.p1, self.p2 + rhs.p2)
    }
}

impl fmt::Display for Payoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.p1, self.p2)
    }
}

/// How a challenge played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Player who issued the challenge
    pub challenger: Player,
    /// Whether the challenged commitment was a bluff
    pub success: bool,
    /// Whether the challenger was forced (empty hand) rather than choosing it
    pub forced: bool,
}

impl Resolution {
    /// Resolve a challenge against the last entry of `history`.
    ///
    /// A challenge succeeds iff the immediately preceding move was a bluff.
    pub fn against(challenger: Player, history: &[Step], forced: bool) -> Self {
        let success = history.last().map_or(false, |step| step.mv.is_bluff());
        Resolution { challenger, success, forced }
    }

    pub fn winner(self) -> Player {
        if self.success {
            self.challenger
        } else {
            self.challenger.opponent()
        }
    }
}

/// Node ID type (index into flat array storage)
pub type NodeId = u32;

/// Why a node has no children (or that it has them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Expanded position where `player` acts
    Decision,
    /// A challenge was just made; the game is over
    Resolved(Resolution),
    /// Exploration stopped at the depth bound; the payoff is an approximation
    Truncated,
}

/// A position in the game tree
///
/// Nodes are immutable after construction. Solver state is stored separately
/// in arrays indexed by `NodeId`.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node (index in flat array)
    pub id: NodeId,
    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,
    /// Child node IDs in move-generation order
    pub children: Vec<NodeId>,
    /// Player to act
    pub player: Player,
    /// Current hands, indexed by `Player::index`
    pub hands: [Hand; 2],
    /// Moves that led here
    pub history: Vec<Step>,
    /// Sum of step payoffs from the root to here
    pub payoff: Payoff,
    /// Number of moves taken so far
    pub depth: u32,
    pub kind: NodeKind,
}

impl Node {
    /// Hand of the given player
    pub fn hand(&self, player: Player) -> Hand {
        self.hands[player.index()]
    }

    /// Hand of the player to act
    pub fn acting_hand(&self) -> Hand {
        self.hand(self.player)
    }

    /// The move that led to this node (None for root)
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|step| step.mv)
    }

    /// Check if this node has no successors
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if this node was cut off by the depth bound
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, NodeKind::Truncated)
    }

    /// Challenge outcome, if this node ends the game
    pub fn resolution(&self) -> Option<Resolution> {
        match self.kind {
            NodeKind::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

/// Game tree wrapper
///
/// Contains a flat array of nodes. Children are always allocated after their
/// parent, so every child ID is greater than its parent's ID.
#[derive(Debug, Clone)]
pub struct GameTree {
    /// Flat array of nodes indexed by NodeId
    pub nodes: Vec<Node>,
}

impl GameTree {
    /// Create a new empty game tree
    pub fn new() -> Self {
        GameTree { nodes: Vec::new() }
    }

    /// ID of the root node
    pub fn root(&self) -> NodeId {
        0
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Child IDs of a node (empty for unknown IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes without children
    pub fn terminals(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_terminal())
    }
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_after_plays() {
        let hand = Hand::new(3, 2);
        assert_eq!(hand.after(Move::PlayTrue { count: 2 }), Some(Hand::new(1, 2)));
        assert_eq!(hand.after(Move::PlayFake { count: 2 }), Some(Hand::new(3, 0)));
        assert_eq!(hand.after(Move::Challenge), Some(hand));
    }

    #[test]
    fn test_hand_after_rejects_overdraw() {
        let hand = Hand::new(1, 0);
        assert_eq!(hand.after(Move::PlayTrue { count: 2 }), None);
        assert_eq!(hand.after(Move::PlayFake { count: 1 }), None);
        assert_eq!(hand.after(Move::PlayTrue { count: 0 }), None);
    }

    #[test]
    fn test_step_display_matches_key_shape() {
        let step = Step::new(Player::Two, Move::PlayFake { count: 3 });
        assert_eq!(step.to_string(), "Player 2 play_fake 3");
        let challenge = Step::new(Player::One, Move::Challenge);
        assert_eq!(challenge.to_string(), "Player 1 challenge");
    }

    #[test]
    fn test_resolution_winner() {
        let bluff = [Step::new(Player::One, Move::PlayFake { count: 1 })];
        let honest = [Step::new(Player::One, Move::PlayTrue { count: 1 })];
        assert_eq!(Resolution::against(Player::Two, &bluff, false).winner(), Player::Two);
        assert_eq!(Resolution::against(Player::Two, &honest, true).winner(), Player::One);
        assert!(!Resolution::against(Player::Two, &[], true).success);
    }

    #[test]
    fn test_payoff_orientation() {
        assert_eq!(Payoff::win_for(Player::One, 3.0), Payoff::new(3.0, -3.0));
        assert_eq!(Payoff::win_for(Player::Two, 3.0), Payoff::new(-3.0, 3.0));
        let sum = Payoff::new(0.25, 0.75) + Payoff::win_for(Player::Two, 3.0);
        assert!((sum.of(Player::Two) - 3.75).abs() < 1e-10);
    }
}
