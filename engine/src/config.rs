//! Analysis configuration
//!
//! Provides the build options shared by every hypothesis tree and the
//! YAML-backed description of a full Bayesian analysis: the deciding
//! player's own hand, the opponent hypotheses with their priors, and the
//! exploration settings.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::bayes::validate_priors;
use crate::error::InputError;
use crate::node::{Hand, Player, MAX_HAND_CARDS};

/// Default cap on the number of nodes a single tree may hold.
pub const DEFAULT_MAX_NODES: u64 = 2_000_000;

fn default_max_depth() -> u32 {
    15
}

fn default_max_nodes() -> u64 {
    DEFAULT_MAX_NODES
}

/// How a challenge edge is valued.
///
/// A forced challenge (the acting player has no cards) always pays the fixed
/// challenge reward. The conventions differ on voluntary challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeConvention {
    /// Voluntary challenges use the oracle step split like any other move
    #[default]
    Legacy,
    /// Voluntary challenges are resolved and pay the fixed challenge reward
    Resolved,
}

/// Which players' edges consult the probability oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OraclePolicy {
    /// Every edge uses the oracle
    #[default]
    Both,
    /// Only the named player's edges use the oracle; the other player's
    /// edges use an even split
    Informed(Player),
}

impl OraclePolicy {
    /// Whether `player`'s edges are valued through the oracle
    pub fn consults(self, player: Player) -> bool {
        match self {
            OraclePolicy::Both => true,
            OraclePolicy::Informed(informed) => informed == player,
        }
    }
}

/// Settings for building one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Nodes at this depth are not expanded
    pub max_depth: u32,
    /// Trees that would exceed this many nodes are rejected before building
    pub max_nodes: u64,
    pub challenge: ChallengeConvention,
    pub oracle: OraclePolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            max_depth: default_max_depth(),
            max_nodes: DEFAULT_MAX_NODES,
            challenge: ChallengeConvention::default(),
            oracle: OraclePolicy::default(),
        }
    }
}

impl BuildOptions {
    pub fn with_depth(max_depth: u32) -> Self {
        BuildOptions { max_depth, ..Self::default() }
    }
}

/// Check a pair of starting hands.
///
/// # Errors
///
/// Returns an error if either hand exceeds [`MAX_HAND_CARDS`] or player one
/// has nothing to open with.
pub fn validate_start(p1: Hand, p2: Hand) -> Result<(), InputError> {
    for (player, hand) in [(Player::One, p1), (Player::Two, p2)] {
        if hand.total() > MAX_HAND_CARDS as u16 {
            return Err(InputError::HandTooLarge { player, hand });
        }
    }
    if p1.is_exhausted() {
        return Err(InputError::EmptyOpeningHand);
    }
    Ok(())
}

/// One possible opponent starting hand and its prior probability.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Hypothesis {
    pub hand: Hand,
    pub prior: f64,
}

/// A Bayesian analysis loaded from YAML.
///
/// The deciding player is player one; `hypotheses` describe player two.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Player one's starting hand
    pub hand: Hand,
    /// Competing opponent hands
    pub hypotheses: Vec<Hypothesis>,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u64,
    #[serde(default)]
    pub challenge: ChallengeConvention,
    /// Restrict oracle use to one player (absent: both players)
    #[serde(default)]
    pub informed_player: Option<Player>,
    /// JSON path table to use as the oracle (absent: no information)
    #[serde(default)]
    pub oracle_table: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the analysis is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed analyses before any tree is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(0));
        }
        validate_priors(self.hypotheses.iter().map(|h| h.prior))?;
        for hypothesis in &self.hypotheses {
            validate_start(self.hand, hypothesis.hand)?;
        }
        Ok(())
    }

    /// Build options shared by every hypothesis tree
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
            challenge: self.challenge,
            oracle: self
                .informed_player
                .map_or(OraclePolicy::Both, OraclePolicy::Informed),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// Failed to parse YAML content
    #[error("failed to parse YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// Analysis input is malformed
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("max_depth must be positive, got {0}")]
    InvalidMaxDepth(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
hand: { truths: 3, fakes: 2 }
max_depth: 8
challenge: resolved
informed_player: one
hypotheses:
  - hand: { truths: 2, fakes: 3 }
    prior: 0.5
  - hand: { truths: 3, fakes: 2 }
    prior: 0.5
"#;

    #[test]
    fn test_parse_sample() {
        let config = AnalysisConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.hand, Hand::new(3, 2));
        assert_eq!(config.hypotheses.len(), 2);
        assert_eq!(config.oracle_table, None);
        let options = config.build_options();
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.challenge, ChallengeConvention::Resolved);
        assert_eq!(options.oracle, OraclePolicy::Informed(Player::One));
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
hand: { truths: 1, fakes: 1 }
hypotheses:
  - hand: { truths: 1, fakes: 0 }
    prior: 1.0
"#;
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.build_options(), BuildOptions::default());
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_nodes, DEFAULT_MAX_NODES);
    }

    #[test]
    fn test_rejects_unnormalized_priors() {
        let yaml = SAMPLE.replace("prior: 0.5\n  - hand: { truths: 3", "prior: 0.25\n  - hand: { truths: 3");
        let err = AnalysisConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Input(InputError::PriorsNotNormalized(_))), "{err}");
    }

    #[test]
    fn test_rejects_empty_hypotheses() {
        let yaml = "hand: { truths: 1, fakes: 0 }\nhypotheses: []\n";
        let err = AnalysisConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Input(InputError::NoHypotheses)));
    }

    #[test]
    fn test_rejects_zero_depth_and_bad_yaml() {
        let yaml = SAMPLE.replace("max_depth: 8", "max_depth: 0");
        assert!(matches!(
            AnalysisConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidMaxDepth(0))
        ));
        assert!(matches!(AnalysisConfig::from_yaml("hand: ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_start() {
        assert_eq!(validate_start(Hand::new(1, 0), Hand::new(0, 0)), Ok(()));
        assert_eq!(
            validate_start(Hand::new(0, 0), Hand::new(1, 0)),
            Err(InputError::EmptyOpeningHand)
        );
        assert_eq!(
            validate_start(Hand::new(1, 0), Hand::new(6, 5)),
            Err(InputError::HandTooLarge { player: Player::Two, hand: Hand::new(6, 5) })
        );
    }

    #[test]
    fn test_oracle_policy() {
        assert!(OraclePolicy::Both.consults(Player::Two));
        assert!(OraclePolicy::Informed(Player::One).consults(Player::One));
        assert!(!OraclePolicy::Informed(Player::One).consults(Player::Two));
    }
}
