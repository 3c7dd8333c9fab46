//! End-to-end Bayesian analysis
//!
//! Builds and solves one tree per opponent hypothesis and aggregates the
//! solved trees at their roots, where player one must commit to a first move
//! without knowing player two's hand.

use bluff_engine::bayes::{best_under_uncertainty, DecisionPoint, Verdict};
use bluff_engine::config::{AnalysisConfig, ConfigError, Hypothesis};
use bluff_engine::error::{AggregateError, InputError};
use bluff_engine::node::GameTree;
use bluff_engine::oracle::ProbabilityOracle;
use bluff_engine::solver::{solve, Solution};
use thiserror::Error;

use crate::builder::build;

/// A solved tree under one opponent hypothesis.
#[derive(Debug, Clone)]
pub struct HypothesisTree {
    pub hypothesis: Hypothesis,
    pub tree: GameTree,
    pub solution: Solution,
}

impl HypothesisTree {
    fn decision_point(&self) -> DecisionPoint<'_> {
        DecisionPoint {
            tree: &self.tree,
            solution: &self.solution,
            node: self.tree.root(),
            prior: self.hypothesis.prior,
        }
    }
}

/// Result of a full analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub trees: Vec<HypothesisTree>,
    pub verdict: Verdict,
}

/// Errors that can occur while running an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Build, solve and aggregate every hypothesis of `config`.
///
/// # Errors
///
/// Returns an error if the configuration is malformed; no tree is built in
/// that case.
pub fn analyze<O: ProbabilityOracle + ?Sized>(
    config: &AnalysisConfig,
    oracle: &O,
) -> Result<Analysis, AnalysisError> {
    config.validate()?;
    let options = config.build_options();

    let mut trees = Vec::with_capacity(config.hypotheses.len());
    for hypothesis in &config.hypotheses {
        let tree = build(config.hand, hypothesis.hand, oracle, &options)?;
        let solution = solve(&tree);
        log::info!(
            "hypothesis {} (prior {:.3}): {} nodes, root value {}",
            hypothesis.hand,
            hypothesis.prior,
            tree.len(),
            solution.payoff(tree.root()).unwrap_or_default()
        );
        trees.push(HypothesisTree { hypothesis: *hypothesis, tree, solution });
    }

    let verdict = {
        let points: Vec<DecisionPoint<'_>> =
            trees.iter().map(HypothesisTree::decision_point).collect();
        best_under_uncertainty(&points)?
    };
    Ok(Analysis { trees, verdict })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluff_engine::node::{Hand, Move};
    use bluff_engine::oracle::NoInformation;

    fn config(hypotheses: Vec<Hypothesis>) -> AnalysisConfig {
        AnalysisConfig {
            hand: Hand::new(2, 1),
            hypotheses,
            max_depth: 6,
            max_nodes: bluff_engine::config::DEFAULT_MAX_NODES,
            challenge: Default::default(),
            informed_player: None,
            oracle_table: None,
        }
    }

    #[test]
    fn test_duplicate_hypothesis_matches_single() {
        let hand = Hand::new(1, 2);
        let single = analyze(&config(vec![Hypothesis { hand, prior: 1.0 }]), &NoInformation).unwrap();
        let split = analyze(
            &config(vec![Hypothesis { hand, prior: 0.5 }, Hypothesis { hand, prior: 0.5 }]),
            &NoInformation,
        )
        .unwrap();
        let a = single.verdict.recommendation().unwrap();
        let b = split.verdict.recommendation().unwrap();
        assert_eq!(a.mv, b.mv);
        assert!((a.expected - b.expected).abs() < 1e-9);
    }

    #[test]
    fn test_recommendation_is_root_move() {
        let analysis = analyze(
            &config(vec![
                Hypothesis { hand: Hand::new(1, 2), prior: 0.3 },
                Hypothesis { hand: Hand::new(2, 1), prior: 0.7 },
            ]),
            &NoInformation,
        )
        .unwrap();
        assert_eq!(analysis.trees.len(), 2);
        let recommendation = analysis.verdict.recommendation().unwrap();
        assert!(!matches!(recommendation.mv, Move::Challenge));
        let expected: f64 = analysis
            .trees
            .iter()
            .zip(&recommendation.values)
            .map(|(tree, value)| tree.hypothesis.prior * value)
            .sum();
        assert!((expected - recommendation.expected).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let err = analyze(&config(vec![]), &NoInformation).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(ConfigError::Input(InputError::NoHypotheses))));
    }
}
