//! Root-to-leaf walks over a game tree for reporting

use rand::Rng;

use crate::config::OraclePolicy;
use crate::node::{GameTree, NodeId, NodeKind, Payoff, Player};
use crate::oracle::{PathKey, ProbabilityOracle};
use crate::solver::Solution;

/// Follow the equilibrium choices from `start` down to a terminal node.
pub fn equilibrium_path(solution: &Solution, start: NodeId) -> Vec<NodeId> {
    let mut path = vec![start];
    let mut current = start;
    while let Some(next) = solution.best_child(current) {
        path.push(next);
        current = next;
    }
    path
}

/// Walk from `start` picking a uniformly random child at every node.
pub fn random_path<R: Rng + ?Sized>(tree: &GameTree, start: NodeId, rng: &mut R) -> Vec<NodeId> {
    let mut path = vec![start];
    let mut current = start;
    loop {
        let children = tree.children(current);
        if children.is_empty() {
            return path;
        }
        current = children[rng.random_range(0..children.len())];
        path.push(current);
    }
}

/// Walk from `start` letting the oracle steer the players it informs.
///
/// An informed player moves to the child whose full path the oracle rates
/// best for them, keeping the first child on ties. Uninformed players, and
/// informed players whose children all rate the same, pick uniformly at
/// random.
pub fn guided_path<O, R>(
    tree: &GameTree,
    start: NodeId,
    oracle: &O,
    policy: OraclePolicy,
    rng: &mut R,
) -> Vec<NodeId>
where
    O: ProbabilityOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut path = vec![start];
    let mut current = start;
    loop {
        let children = tree.children(current);
        if children.is_empty() {
            return path;
        }
        let mover = tree.get(current).map(|node| node.player);
        current = match mover {
            Some(player) if policy.consults(player) => {
                steer(tree, children, oracle, player).unwrap_or_else(|| {
                    children[rng.random_range(0..children.len())]
                })
            }
            _ => children[rng.random_range(0..children.len())],
        };
        path.push(current);
    }
}

/// Best-rated child for `player`, `None` when every child rates the same.
fn steer<O: ProbabilityOracle + ?Sized>(
    tree: &GameTree,
    children: &[NodeId],
    oracle: &O,
    player: Player,
) -> Option<NodeId> {
    let rated: Vec<(NodeId, f64)> = children
        .iter()
        .filter_map(|&id| tree.get(id))
        .map(|child| {
            let p = oracle.probability(&PathKey::from_steps(&child.history));
            let rating = match player {
                Player::One => p,
                Player::Two => 1.0 - p,
            };
            (child.id, rating)
        })
        .collect();
    let &(first_id, first) = rated.first()?;
    if rated.iter().all(|&(_, rating)| rating == first) {
        return None;
    }
    let mut best = (first_id, first);
    for &(id, rating) in &rated[1..] {
        if rating > best.1 {
            best = (id, rating);
        }
    }
    log::trace!("player {} steered to node {} ({:.3})", player, best.0, best.1);
    Some(best.0)
}

/// Mean cumulative payoff of the last node of each path.
///
/// Returns `None` when no path ends in a known node.
pub fn average_payoff(tree: &GameTree, paths: &[Vec<NodeId>]) -> Option<Payoff> {
    let finals: Vec<Payoff> = paths
        .iter()
        .filter_map(|path| path.last())
        .filter_map(|&id| tree.get(id))
        .map(|node| node.payoff)
        .collect();
    if finals.is_empty() {
        return None;
    }
    let n = finals.len() as f64;
    let total = finals.into_iter().fold(Payoff::ZERO, |acc, payoff| acc + payoff);
    Some(Payoff::new(total.p1 / n, total.p2 / n))
}

/// Multi-line description of a node for path reports.
pub fn describe(tree: &GameTree, id: NodeId) -> String {
    let Some(node) = tree.get(id) else {
        return format!("node {} (unknown)\n", id);
    };
    let status = match node.kind {
        NodeKind::Decision => format!("player {} to act", node.player),
        NodeKind::Truncated => "depth-truncated".to_string(),
        NodeKind::Resolved(r) => format!(
            "{} challenge by player {} {}, player {} wins",
            if r.forced { "forced" } else { "voluntary" },
            r.challenger,
            if r.success { "succeeds" } else { "fails" },
            r.winner()
        ),
    };
    let mut out = format!(
        "node {} | depth {} | {}\n  hands   : P1 {}  P2 {}\n  payoff  : {}\n",
        node.id, node.depth, status, node.hands[0], node.hands[1], node.payoff
    );
    if let Some(step) = node.history.last() {
        out.push_str(&format!("  last    : {}\n", step));
    }
    out
}
