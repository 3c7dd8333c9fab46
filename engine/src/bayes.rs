//! Bayesian aggregation of solved hypothesis trees
//!
//! A player who does not know the opponent's starting hand builds and solves
//! one tree per hypothesis. At a decision point that all hypotheses share, a
//! move is scored by its equilibrium value in each tree weighted by the
//! hypothesis prior, and the best-scoring move is recommended.
//!
//! Moves are matched across trees by structural equality of the last move of
//! each child. A move missing from any hypothesis is excluded from the
//! comparison rather than scored on a partial set of hypotheses.

use crate::error::{AggregateError, InputError};
use crate::node::{GameTree, Move, Node, NodeId, Player};
use crate::solver::Solution;

/// Tolerance on the sum of priors.
pub const PRIOR_TOLERANCE: f64 = 1e-9;

/// One hypothesis at the shared decision point.
#[derive(Debug, Clone, Copy)]
pub struct DecisionPoint<'a> {
    pub tree: &'a GameTree,
    pub solution: &'a Solution,
    /// The deciding node inside `tree`
    pub node: NodeId,
    /// Prior probability of this hypothesis
    pub prior: f64,
}

/// The recommended move and how it scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub mv: Move,
    /// Prior-weighted equilibrium value for the deciding player
    pub expected: f64,
    /// Child reached by the move, per hypothesis
    pub children: Vec<NodeId>,
    /// Equilibrium value of that child for the deciding player, per hypothesis
    pub values: Vec<f64>,
}

/// Outcome of an aggregation.
///
/// `NoFeasibleMove` is distinct from any scored move so that infeasibility
/// cannot be mistaken for a move worth zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Play(Recommendation),
    NoFeasibleMove,
}

impl Verdict {
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Verdict::Play(recommendation) => Some(recommendation),
            Verdict::NoFeasibleMove => None,
        }
    }
}

/// Check that priors form a probability distribution.
///
/// # Errors
///
/// Returns an error for an empty set, a prior outside [0, 1] (or not
/// finite), or priors that do not sum to 1.
pub fn validate_priors(priors: impl IntoIterator<Item = f64>) -> Result<(), InputError> {
    let mut count = 0usize;
    let mut sum = 0.0;
    for prior in priors {
        if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
            return Err(InputError::InvalidPrior(prior));
        }
        count += 1;
        sum += prior;
    }
    if count == 0 {
        return Err(InputError::NoHypotheses);
    }
    if (sum - 1.0).abs() > PRIOR_TOLERANCE {
        return Err(InputError::PriorsNotNormalized(sum));
    }
    Ok(())
}

/// Resolve every decision node and check they describe the same point in the
/// game from the deciding player's perspective.
fn decision_nodes<'a>(points: &[DecisionPoint<'a>]) -> Result<Vec<&'a Node>, AggregateError> {
    let mut nodes: Vec<&'a Node> = Vec::with_capacity(points.len());
    for (hypothesis, point) in points.iter().enumerate() {
        let node = point
            .tree
            .get(point.node)
            .ok_or(AggregateError::UnknownNode { hypothesis, node: point.node })?;
        if node.is_terminal() {
            return Err(AggregateError::TerminalDecisionPoint(point.node));
        }
        if let Some(first) = nodes.first() {
            if node.player != first.player {
                return Err(AggregateError::MismatchedDecisionPoint {
                    hypothesis,
                    reason: "acting player differs",
                });
            }
            if node.history != first.history {
                return Err(AggregateError::MismatchedDecisionPoint {
                    hypothesis,
                    reason: "history differs",
                });
            }
            if node.acting_hand() != first.acting_hand() {
                log::warn!(
                    "hypothesis {} gives the deciding player {} instead of {}",
                    hypothesis,
                    node.acting_hand(),
                    first.acting_hand()
                );
            }
        }
        nodes.push(node);
    }
    Ok(nodes)
}

/// The child of `node` reached by `mv`, if the move exists there.
fn child_by_move(tree: &GameTree, node: &Node, mv: Move) -> Option<NodeId> {
    node.children
        .iter()
        .copied()
        .find(|&child| tree.get(child).and_then(Node::last_move) == Some(mv))
}

/// Expected-value-maximizing move across hypotheses.
///
/// Candidate moves are taken from the first hypothesis in move-generation
/// order; ties keep the earliest candidate.
///
/// # Errors
///
/// Returns an error for malformed priors, unknown or terminal decision
/// nodes, or decision nodes that disagree on the acting player or history.
pub fn best_under_uncertainty(points: &[DecisionPoint<'_>]) -> Result<Verdict, AggregateError> {
    validate_priors(points.iter().map(|point| point.prior))?;
    let nodes = decision_nodes(points)?;
    let me: Player = nodes[0].player;

    let mut best: Option<Recommendation> = None;
    'moves: for &candidate in &nodes[0].children {
        let Some(mv) = points[0].tree.get(candidate).and_then(Node::last_move) else {
            continue;
        };

        let mut children = Vec::with_capacity(points.len());
        let mut values = Vec::with_capacity(points.len());
        let mut expected = 0.0;
        for (hypothesis, (point, node)) in points.iter().zip(&nodes).enumerate() {
            let Some(child) = child_by_move(point.tree, node, mv) else {
                log::debug!("{} is infeasible under hypothesis {}, skipping", mv, hypothesis);
                continue 'moves;
            };
            let value = point
                .solution
                .payoff(child)
                .ok_or(AggregateError::UnknownNode { hypothesis, node: child })?
                .of(me);
            expected += point.prior * value;
            children.push(child);
            values.push(value);
        }

        log::trace!("{} scores {:.4} for player {}", mv, expected, me);
        if best.as_ref().map_or(true, |incumbent| expected > incumbent.expected) {
            best = Some(Recommendation { mv, expected, children, values });
        }
    }

    Ok(match best {
        Some(recommendation) => {
            log::debug!(
                "player {} should {} (expected {:.4})",
                me,
                recommendation.mv,
                recommendation.expected
            );
            Verdict::Play(recommendation)
        }
        None => {
            log::debug!("no move is feasible under every hypothesis");
            Verdict::NoFeasibleMove
        }
    })
}
