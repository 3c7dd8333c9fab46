//! Hand-built fixture trees for solver and aggregator validation
//!
//! Payoffs are fixed rather than oracle-derived so that the expected
//! equilibrium can be read off the diagrams below.
//!
//! `build_test_tree`: P1 (1,1) vs P2 (1,0), depth bound 2:
//!   0: Decision P1  [PlayTrue 1 → 1, PlayFake 1 → 2]
//!   1: Decision P2  [PlayTrue 1 → 3, Challenge → 4]
//!   2: Decision P2  [PlayTrue 1 → 5, Challenge → 6]
//!   3: Truncated                       payoff (0.2, 0.8)
//!   4: Resolved (P2 challenge fails)   payoff (0.9, 0.1)
//!   5: Truncated                       payoff (0.4, 0.6)
//!   6: Resolved (P2 challenge wins)    payoff (0.1, 0.9)

use crate::node::{
    GameTree, Hand, Move, Node, NodeId, NodeKind, Payoff, Player, Resolution, Step,
};

fn push(
    nodes: &mut Vec<Node>,
    parent: Option<NodeId>,
    player: Player,
    hands: [Hand; 2],
    history: Vec<Step>,
    payoff: Payoff,
    kind: NodeKind,
) -> NodeId {
    let id = nodes.len() as NodeId;
    if let Some(parent) = parent {
        nodes[parent as usize].children.push(id);
    }
    nodes.push(Node {
        id,
        parent,
        children: Vec::new(),
        player,
        hands,
        depth: history.len() as u32,
        history,
        payoff,
        kind,
    });
    id
}

fn challenge(history: &[Step], challenger: Player, forced: bool) -> NodeKind {
    NodeKind::Resolved(Resolution::against(challenger, history, forced))
}

fn step(player: Player, mv: Move) -> Step {
    Step::new(player, mv)
}

/// Build the 7-node test tree.
/// Nodes are pushed in ID order so that `tree.nodes[id] == node with id`.
pub fn build_test_tree() -> GameTree {
    let mut nodes = Vec::with_capacity(7);
    let p1_true = step(Player::One, Move::PlayTrue { count: 1 });
    let p1_fake = step(Player::One, Move::PlayFake { count: 1 });
    let p2_true = step(Player::Two, Move::PlayTrue { count: 1 });
    let p2_call = step(Player::Two, Move::Challenge);
    let even = Payoff::new(0.5, 0.5);

    let root = push(
        &mut nodes,
        None,
        Player::One,
        [Hand::new(1, 1), Hand::new(1, 0)],
        vec![],
        Payoff::ZERO,
        NodeKind::Decision,
    );

    // Node 1: P1 played true
    let after_true = vec![p1_true];
    let n1 = push(
        &mut nodes,
        Some(root),
        Player::Two,
        [Hand::new(0, 1), Hand::new(1, 0)],
        after_true.clone(),
        even,
        NodeKind::Decision,
    );

    // Node 2: P1 bluffed
    let after_fake = vec![p1_fake];
    let n2 = push(
        &mut nodes,
        Some(root),
        Player::Two,
        [Hand::new(1, 0), Hand::new(1, 0)],
        after_fake.clone(),
        even,
        NodeKind::Decision,
    );

    // Nodes 3, 4: replies to the honest play
    push(
        &mut nodes,
        Some(n1),
        Player::One,
        [Hand::new(0, 1), Hand::new(0, 0)],
        vec![p1_true, p2_true],
        Payoff::new(0.2, 0.8),
        NodeKind::Truncated,
    );
    push(
        &mut nodes,
        Some(n1),
        Player::One,
        [Hand::new(0, 1), Hand::new(1, 0)],
        vec![p1_true, p2_call],
        Payoff::new(0.9, 0.1),
        challenge(&after_true, Player::Two, false),
    );

    // Nodes 5, 6: replies to the bluff
    push(
        &mut nodes,
        Some(n2),
        Player::One,
        [Hand::new(1, 0), Hand::new(0, 0)],
        vec![p1_fake, p2_true],
        Payoff::new(0.4, 0.6),
        NodeKind::Truncated,
    );
    push(
        &mut nodes,
        Some(n2),
        Player::One,
        [Hand::new(1, 0), Hand::new(1, 0)],
        vec![p1_fake, p2_call],
        Payoff::new(0.1, 0.9),
        challenge(&after_fake, Player::Two, false),
    );

    GameTree { nodes }
}

/// Root where both of P1's moves are worth the same to P1.
///
///   0: Decision P1  [PlayTrue 1 → 1, PlayTrue 2 → 2]
///   1: Truncated    payoff (0.5, 0.5)
///   2: Truncated    payoff (0.5, 0.2)
pub fn build_tie_tree() -> GameTree {
    let mut nodes = Vec::with_capacity(3);
    let root = push(
        &mut nodes,
        None,
        Player::One,
        [Hand::new(2, 0), Hand::new(1, 0)],
        vec![],
        Payoff::ZERO,
        NodeKind::Decision,
    );
    for (count, payoff) in [(1, Payoff::new(0.5, 0.5)), (2, Payoff::new(0.5, 0.2))] {
        push(
            &mut nodes,
            Some(root),
            Player::Two,
            [Hand::new(2 - count, 0), Hand::new(1, 0)],
            vec![step(Player::One, Move::PlayTrue { count })],
            payoff,
            NodeKind::Truncated,
        );
    }
    GameTree { nodes }
}

/// Hypothesis tree where P1 holds no bluff card.
///
///   0: Decision P1  [PlayTrue 1 → 1]
///   1: Decision P2  [PlayTrue 1 → 2, Challenge → 3]
///   2: Truncated                       payoff (0.4, 0.6)
///   3: Resolved (P2 challenge fails)   payoff (0.9, 0.1)
pub fn build_honest_tree() -> GameTree {
    let mut nodes = Vec::with_capacity(4);
    let p1_true = step(Player::One, Move::PlayTrue { count: 1 });
    let root = push(
        &mut nodes,
        None,
        Player::One,
        [Hand::new(1, 0), Hand::new(1, 0)],
        vec![],
        Payoff::ZERO,
        NodeKind::Decision,
    );
    let n1 = push(
        &mut nodes,
        Some(root),
        Player::Two,
        [Hand::new(0, 0), Hand::new(1, 0)],
        vec![p1_true],
        Payoff::new(0.5, 0.5),
        NodeKind::Decision,
    );
    push(
        &mut nodes,
        Some(n1),
        Player::One,
        [Hand::new(0, 0), Hand::new(0, 0)],
        vec![p1_true, step(Player::Two, Move::PlayTrue { count: 1 })],
        Payoff::new(0.4, 0.6),
        NodeKind::Truncated,
    );
    push(
        &mut nodes,
        Some(n1),
        Player::One,
        [Hand::new(0, 0), Hand::new(1, 0)],
        vec![p1_true, step(Player::Two, Move::Challenge)],
        Payoff::new(0.9, 0.1),
        challenge(&[p1_true], Player::Two, false),
    );
    GameTree { nodes }
}

/// Hypothesis tree where P1 can only bluff and P2 holds nothing.
///
///   0: Decision P1  [PlayFake 1 → 1]
///   1: Decision P2  [forced Challenge → 2]
///   2: Resolved (forced, succeeds)     payoff (-2.5, 3.5)
pub fn build_bluff_tree() -> GameTree {
    let mut nodes = Vec::with_capacity(3);
    let p1_fake = step(Player::One, Move::PlayFake { count: 1 });
    let root = push(
        &mut nodes,
        None,
        Player::One,
        [Hand::new(0, 1), Hand::new(0, 0)],
        vec![],
        Payoff::ZERO,
        NodeKind::Decision,
    );
    let n1 = push(
        &mut nodes,
        Some(root),
        Player::Two,
        [Hand::new(0, 0), Hand::new(0, 0)],
        vec![p1_fake],
        Payoff::new(0.5, 0.5),
        NodeKind::Decision,
    );
    push(
        &mut nodes,
        Some(n1),
        Player::One,
        [Hand::new(0, 0), Hand::new(0, 0)],
        vec![p1_fake, step(Player::Two, Move::Challenge)],
        Payoff::new(-2.5, 3.5),
        challenge(&[p1_fake], Player::Two, true),
    );
    GameTree { nodes }
}
