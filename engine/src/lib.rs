//! bluff Engine - Core game model and solver logic
//!
//! This crate contains the game vocabulary (hands, moves, nodes), the
//! probability oracle interface, the backward-induction solver and the
//! Bayesian aggregator that combines solved trees across opponent hypotheses.
//!
//! Tree construction lives in the `bluff-tree` crate; the engine only reads
//! finished trees.

pub mod bayes;
pub mod config;
pub mod error;
pub mod moves;
pub mod node;
pub mod oracle;
pub mod solver;
#[cfg(test)]
mod test_tree;
pub mod trace;

pub use bayes::{best_under_uncertainty, DecisionPoint, Recommendation, Verdict};
pub use config::{AnalysisConfig, BuildOptions, ChallengeConvention, OraclePolicy};
pub use error::{AggregateError, InputError};
pub use node::{GameTree, Hand, Move, Node, NodeId, NodeKind, Payoff, Player, Step};
pub use oracle::{NoInformation, PathKey, PathTable, ProbabilityOracle};
pub use solver::{solve, solve_parallel, Solution};
