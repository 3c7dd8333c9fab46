//! Depth-first game tree construction
//!
//! Starting from player one to move with an empty history, every reachable
//! position is expanded until a challenge ends the line or the depth bound is
//! reached. Each edge carries an immediate payoff split that is added to the
//! parent's cumulative payoff:
//!
//! - a forced challenge (acting hand exhausted) pays the fixed challenge
//!   reward to the winner;
//! - a voluntary challenge pays the oracle split under
//!   `ChallengeConvention::Legacy` and the fixed reward under
//!   `ChallengeConvention::Resolved`;
//! - every other move pays `(p, 1 - p)` where `p` is the oracle probability
//!   of the full path, or an even split when the policy does not consult the
//!   oracle for the acting player.

use bluff_engine::config::{validate_start, BuildOptions, ChallengeConvention};
use bluff_engine::error::InputError;
use bluff_engine::moves::legal_moves;
use bluff_engine::node::{
    GameTree, Hand, Move, Node, NodeId, NodeKind, Payoff, Player, Resolution, Step,
    CHALLENGE_REWARD,
};
use std::collections::HashMap;
use bluff_engine::oracle::{PathKey, ProbabilityOracle, NO_INFORMATION};

/// Counts describing a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub nodes: usize,
    pub decisions: usize,
    pub resolved: usize,
    pub truncated: usize,
    pub deepest: u32,
}

impl TreeStats {
    pub fn of(tree: &GameTree) -> Self {
        tree.nodes.iter().fold(TreeStats::default(), |mut stats, node| {
            stats.nodes += 1;
            stats.deepest = stats.deepest.max(node.depth);
            match node.kind {
                NodeKind::Decision => stats.decisions += 1,
                NodeKind::Resolved(_) => stats.resolved += 1,
                NodeKind::Truncated => stats.truncated += 1,
            }
            stats
        })
    }
}

/// Arena-backed builder. Node IDs are indices into `nodes` and are only
/// meaningful for the tree this builder produces.
struct TreeBuilder<'o, O: ?Sized> {
    oracle: &'o O,
    options: BuildOptions,
    nodes: Vec<Node>,
}

impl<'o, O: ProbabilityOracle + ?Sized> TreeBuilder<'o, O> {
    fn new(oracle: &'o O, options: BuildOptions) -> Self {
        TreeBuilder { oracle, options, nodes: Vec::new() }
    }

    /// Kind of a freshly created, not yet expanded position.
    fn open_kind(&self, depth: u32) -> NodeKind {
        if depth >= self.options.max_depth {
            NodeKind::Truncated
        } else {
            NodeKind::Decision
        }
    }

    /// Append a node and link it under its parent.
    fn push(&mut self, mut node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        node.id = id;
        if let Some(parent) = node.parent {
            self.nodes[parent as usize].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// Create the child reached from `parent` by `step`.
    fn child(
        &self,
        parent: &Expansion,
        history: &[Step],
        step: Step,
        hands: [Hand; 2],
        gain: Payoff,
        kind: NodeKind,
    ) -> Node {
        let mut child_history = Vec::with_capacity(history.len() + 1);
        child_history.extend_from_slice(history);
        child_history.push(step);
        Node {
            id: 0,
            parent: Some(parent.id),
            children: Vec::new(),
            player: parent.player.opponent(),
            hands,
            history: child_history,
            payoff: parent.payoff + gain,
            depth: parent.depth + 1,
            kind,
        }
    }

    /// Oracle split for a candidate edge
    fn split(&self, history: &[Step], step: Step) -> Payoff {
        let p = if self.options.oracle.consults(step.player) {
            self.oracle.probability(&PathKey::new(history, step))
        } else {
            NO_INFORMATION
        };
        Payoff::new(p, 1.0 - p)
    }

    fn build(mut self, p1: Hand, p2: Hand) -> GameTree {
        let root = Node {
            id: 0,
            parent: None,
            children: Vec::new(),
            player: Player::One,
            hands: [p1, p2],
            history: Vec::new(),
            payoff: Payoff::ZERO,
            depth: 0,
            kind: self.open_kind(0),
        };
        let mut stack = vec![self.push(root)];

        while let Some(id) = stack.pop() {
            let parent = Expansion::of(&self.nodes[id as usize]);
            if parent.depth >= self.options.max_depth {
                continue;
            }
            // Moved out while children are pushed, restored below.
            let history = std::mem::take(&mut self.nodes[id as usize].history);
            self.expand(&parent, &history, &mut stack);
            self.nodes[id as usize].history = history;
        }

        GameTree { nodes: self.nodes }
    }

    /// Push every child of `parent`, queueing the open ones on `stack`.
    fn expand(&mut self, parent: &Expansion, history: &[Step], stack: &mut Vec<NodeId>) {
        let player = parent.player;
        let hand = parent.hands[player.index()];

        if hand.is_exhausted() {
            let resolution = Resolution::against(player, history, true);
            let gain = Payoff::win_for(resolution.winner(), CHALLENGE_REWARD);
            log::trace!("node {} forces player {} to challenge", parent.id, player);
            let child = self.child(
                parent,
                history,
                Step::new(player, Move::Challenge),
                parent.hands,
                gain,
                NodeKind::Resolved(resolution),
            );
            self.push(child);
            return;
        }

        for step in legal_moves(player, hand, history.is_empty()) {
            let child = if step.mv.is_challenge() {
                let resolution = Resolution::against(player, history, false);
                let gain = match self.options.challenge {
                    ChallengeConvention::Legacy => self.split(history, step),
                    ChallengeConvention::Resolved => {
                        Payoff::win_for(resolution.winner(), CHALLENGE_REWARD)
                    }
                };
                self.child(parent, history, step, parent.hands, gain, NodeKind::Resolved(resolution))
            } else {
                let Some(remaining) = hand.after(step.mv) else { continue };
                let mut hands = parent.hands;
                hands[player.index()] = remaining;
                let gain = self.split(history, step);
                let kind = self.open_kind(parent.depth + 1);
                self.child(parent, history, step, hands, gain, kind)
            };
            let open = matches!(child.kind, NodeKind::Decision);
            let child_id = self.push(child);
            if open {
                stack.push(child_id);
            }
        }
    }
}

/// The parts of a node its children are derived from.
#[derive(Debug, Clone, Copy)]
struct Expansion {
    id: NodeId,
    player: Player,
    hands: [Hand; 2],
    depth: u32,
    payoff: Payoff,
}

impl Expansion {
    fn of(node: &Node) -> Self {
        Expansion {
            id: node.id,
            player: node.player,
            hands: node.hands,
            depth: node.depth,
            payoff: node.payoff,
        }
    }
}

/// Number of nodes `build` would create for these hands and depth bound.
///
/// Subtree sizes depend only on the hands, the player to move and the depth,
/// so they are memoized and the count never walks the tree itself.
pub fn count_nodes(p1: Hand, p2: Hand, max_depth: u32) -> u64 {
    let mut memo = HashMap::new();
    subtree_size([p1, p2], Player::One, 0, max_depth, &mut memo)
}

type SizeKey = ([Hand; 2], Player, u32);

fn subtree_size(
    hands: [Hand; 2],
    player: Player,
    depth: u32,
    max_depth: u32,
    memo: &mut HashMap<SizeKey, u64>,
) -> u64 {
    if depth >= max_depth {
        return 1;
    }
    let hand = hands[player.index()];
    if hand.is_exhausted() {
        return 2;
    }
    if let Some(&size) = memo.get(&(hands, player, depth)) {
        return size;
    }

    let mut size: u64 = 1;
    for step in legal_moves(player, hand, depth == 0) {
        let below = if step.mv.is_challenge() {
            1
        } else if let Some(remaining) = hand.after(step.mv) {
            let mut next = hands;
            next[player.index()] = remaining;
            subtree_size(next, player.opponent(), depth + 1, max_depth, memo)
        } else {
            0
        };
        size = size.saturating_add(below);
    }
    memo.insert((hands, player, depth), size);
    size
}

/// Build the full game tree for a pair of starting hands.
///
/// The root is node 0 with player one to move. Every child ID is greater
/// than its parent's.
///
/// # Errors
///
/// Returns an error if either hand is larger than the supported maximum,
/// player one has no card to open with, or the tree would exceed
/// `options.max_nodes`. Nothing is built in those cases.
pub fn build<O: ProbabilityOracle + ?Sized>(
    p1: Hand,
    p2: Hand,
    oracle: &O,
    options: &BuildOptions,
) -> Result<GameTree, InputError> {
    validate_start(p1, p2)?;
    let nodes = count_nodes(p1, p2, options.max_depth);
    if nodes > options.max_nodes {
        return Err(InputError::TreeTooLarge { nodes, limit: options.max_nodes });
    }
    let tree = TreeBuilder::new(oracle, *options).build(p1, p2);
    let stats = TreeStats::of(&tree);
    log::debug!(
        "built tree {} vs {} to depth {}: {} nodes, {} resolved, {} truncated",
        p1,
        p2,
        options.max_depth,
        stats.nodes,
        stats.resolved,
        stats.truncated
    );
    Ok(tree)
}
