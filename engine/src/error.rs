//! Error types for malformed input and failed aggregation

use thiserror::Error;

use crate::node::{Hand, NodeId, Player, MAX_HAND_CARDS};

/// Malformed analysis input, rejected before any exploration begins.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("hand {hand} for player {player} exceeds {MAX_HAND_CARDS} cards")]
    HandTooLarge { player: Player, hand: Hand },

    #[error("player 1 must open with at least one card")]
    EmptyOpeningHand,

    #[error("no opponent hypotheses supplied")]
    NoHypotheses,

    #[error("tree would hold {nodes} nodes, more than the limit of {limit}")]
    TreeTooLarge { nodes: u64, limit: u64 },

    #[error("prior {0} is not a probability")]
    InvalidPrior(f64),

    #[error("priors sum to {0}, expected 1")]
    PriorsNotNormalized(f64),
}

/// Failures while combining solved hypothesis trees.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("node {node} not found in hypothesis {hypothesis}")]
    UnknownNode { hypothesis: usize, node: NodeId },

    #[error("hypothesis {hypothesis} does not share the decision point: {reason}")]
    MismatchedDecisionPoint { hypothesis: usize, reason: &'static str },

    #[error("node {0} has no moves to choose from")]
    TerminalDecisionPoint(NodeId),
}
