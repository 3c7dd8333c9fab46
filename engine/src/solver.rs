//! Backward induction: subgame-perfect equilibrium of a built game tree
//!
//! Every terminal node is worth its own cumulative payoff. Every internal node
//! is worth the value of the child that maximizes the acting player's
//! coordinate; ties keep the earliest child in move-generation order.
//!
//! The solver never touches `Node`; results are written into a `Solution`
//! whose arrays are indexed by `NodeId`, each entry exactly once.
//!
//! `solve_parallel` follows the same collect-then-apply shape as the rest of
//! the engine: sibling subtrees below the root are traversed concurrently via
//! Rayon with only a shared `&GameTree`, each returning its own list of
//! choices, which are then written into the solution sequentially.

use crate::node::{GameTree, Node, NodeId, Payoff};
use rayon::prelude::*;
use std::collections::HashMap;

/// Best continuation payoff and best child for every node of one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// best_payoff[node_id]: value of the node under mutual optimal play
    best_payoff: Vec<Payoff>,
    /// best_child[node_id]: the acting player's choice (None for terminals)
    best_child: Vec<Option<NodeId>>,
}

impl Solution {
    /// Equilibrium value of a node
    pub fn payoff(&self, id: NodeId) -> Option<Payoff> {
        self.best_payoff.get(id as usize).copied()
    }

    /// Equilibrium choice at a node; `None` for terminals and unknown IDs
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        self.best_child.get(id as usize).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.best_payoff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_payoff.is_empty()
    }
}

/// One settled node produced by a traversal.
#[derive(Debug, Clone, Copy)]
struct Choice {
    node: NodeId,
    payoff: Payoff,
    child: Option<NodeId>,
}

/// Pick the child maximizing the acting player's value.
///
/// `value` must already be known for every child.
fn choose(node: &Node, value: impl Fn(NodeId) -> Option<Payoff>) -> Choice {
    let mut best: Option<(Payoff, NodeId)> = None;
    for &child in &node.children {
        let Some(candidate) = value(child) else { continue };
        let improves = match best {
            None => true,
            Some((incumbent, _)) => candidate.of(node.player) > incumbent.of(node.player),
        };
        if improves {
            best = Some((candidate, child));
        }
    }
    match best {
        Some((payoff, child)) => Choice { node: node.id, payoff, child: Some(child) },
        None => Choice { node: node.id, payoff: node.payoff, child: None },
    }
}

/// Explicit post-order traversal of the subtree rooted at `start`.
///
/// `known` holds values settled earlier; newly settled values are recorded in
/// it and reported through `settle`.
fn induct(
    tree: &GameTree,
    start: NodeId,
    known: &mut dyn KnownValues,
    settle: &mut dyn FnMut(Choice),
) {
    let mut stack: Vec<(NodeId, bool)> = vec![(start, false)];
    while let Some((id, expanded)) = stack.pop() {
        if known.value(id).is_some() {
            continue;
        }
        let Some(node) = tree.get(id) else { continue };
        if expanded || node.is_terminal() {
            let choice = choose(node, |child| known.value(child));
            known.store(choice.node, choice.payoff);
            settle(choice);
        } else {
            stack.push((id, true));
            stack.extend(node.children.iter().rev().map(|&child| (child, false)));
        }
    }
}

/// Value storage used during a traversal.
trait KnownValues {
    fn value(&self, id: NodeId) -> Option<Payoff>;
    fn store(&mut self, id: NodeId, payoff: Payoff);
}

impl KnownValues for Vec<Option<Payoff>> {
    fn value(&self, id: NodeId) -> Option<Payoff> {
        self.get(id as usize).copied().flatten()
    }

    fn store(&mut self, id: NodeId, payoff: Payoff) {
        if let Some(slot) = self.get_mut(id as usize) {
            *slot = Some(payoff);
        }
    }
}

impl KnownValues for HashMap<NodeId, Payoff> {
    fn value(&self, id: NodeId) -> Option<Payoff> {
        self.get(&id).copied()
    }

    fn store(&mut self, id: NodeId, payoff: Payoff) {
        self.insert(id, payoff);
    }
}

/// Collects choices into the dense solution arrays.
struct Builder {
    best_payoff: Vec<Option<Payoff>>,
    best_child: Vec<Option<NodeId>>,
}

impl Builder {
    fn new(len: usize) -> Self {
        Builder { best_payoff: vec![None; len], best_child: vec![None; len] }
    }

    fn apply(&mut self, choice: Choice) {
        let index = choice.node as usize;
        self.best_payoff[index] = Some(choice.payoff);
        self.best_child[index] = choice.child;
    }

    fn finish(self, tree: &GameTree) -> Solution {
        let best_payoff = self
            .best_payoff
            .into_iter()
            .zip(&tree.nodes)
            .map(|(value, node)| value.unwrap_or(node.payoff))
            .collect();
        Solution { best_payoff, best_child: self.best_child }
    }
}

/// Solve every node of the tree by backward induction.
///
/// A pure function of the tree: solving the same tree twice yields identical
/// solutions.
pub fn solve(tree: &GameTree) -> Solution {
    let mut known: Vec<Option<Payoff>> = vec![None; tree.len()];
    let mut builder = Builder::new(tree.len());
    for node in &tree.nodes {
        induct(tree, node.id, &mut known, &mut |choice| builder.apply(choice));
    }
    let solution = builder.finish(tree);
    log_summary(tree, &solution);
    solution
}

/// Same result as [`solve`], with the root's child subtrees solved in
/// parallel.
pub fn solve_parallel(tree: &GameTree) -> Solution {
    let Some(root) = tree.get(tree.root()) else {
        return solve(tree);
    };

    // Each child subtree is independent (disjoint node sets, shared immutable
    // tree), so Rayon can process them without locks.
    let subtrees: Vec<Vec<Choice>> = root
        .children
        .par_iter()
        .map(|&child| {
            let mut known: HashMap<NodeId, Payoff> = HashMap::new();
            let mut choices = Vec::new();
            induct(tree, child, &mut known, &mut |choice| choices.push(choice));
            choices
        })
        .collect();

    let mut known: Vec<Option<Payoff>> = vec![None; tree.len()];
    let mut builder = Builder::new(tree.len());
    for choice in subtrees.into_iter().flatten() {
        known.store(choice.node, choice.payoff);
        builder.apply(choice);
    }
    for node in &tree.nodes {
        induct(tree, node.id, &mut known, &mut |choice| builder.apply(choice));
    }
    let solution = builder.finish(tree);
    log_summary(tree, &solution);
    solution
}

fn log_summary(tree: &GameTree, solution: &Solution) {
    if let Some(value) = solution.payoff(tree.root()) {
        log::debug!("solved {} nodes, root value {}", solution.len(), value);
    }
}
