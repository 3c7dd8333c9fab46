//! Probability oracle: empirical likelihood of an action path
//!
//! The tree builder asks the oracle, for every candidate edge, how often the
//! full action path (history plus the candidate) historically favored player
//! one. The answer becomes that edge's immediate payoff split. Paths the oracle
//! has never seen fall back to the no-information prior of 0.5.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::node::{Player, Step};

/// Probability used when the oracle has nothing to say about a path.
pub const NO_INFORMATION: f64 = 0.5;

/// Separator between steps in a path key.
pub const PATH_SEPARATOR: &str = " -> ";

/// Lookup key: every step rendered as `Player <n> <kind> <count>` and joined
/// with [`PATH_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(String);

impl PathKey {
    /// Key for `history` followed by the candidate step
    pub fn new(history: &[Step], candidate: Step) -> Self {
        Self::from_steps(history.iter().chain(std::iter::once(&candidate)))
    }

    pub fn from_steps<'a>(steps: impl IntoIterator<Item = &'a Step>) -> Self {
        let rendered: Vec<String> = steps.into_iter().map(Step::to_string).collect();
        PathKey(rendered.join(PATH_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an oracle knows about a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evidence {
    /// Historical win counts for each player
    Counts(WinCounts),
    /// A pre-divided probability that the path favored player one
    Probability(f64),
}

impl Evidence {
    /// Probability that the path favored player one, in [0, 1]
    pub fn probability(self) -> f64 {
        match self {
            Evidence::Counts(counts) => counts.probability(),
            Evidence::Probability(p) if p.is_nan() => NO_INFORMATION,
            Evidence::Probability(p) => p.clamp(0.0, 1.0),
        }
    }
}

/// Win tallies for a path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinCounts {
    pub p1_wins: u64,
    pub p2_wins: u64,
}

impl WinCounts {
    /// Games recorded for the path, saturating at `u64::MAX`
    pub fn total(self) -> u64 {
        self.p1_wins.saturating_add(self.p2_wins)
    }

    /// Share of player one wins; 0.5 when nothing was recorded
    pub fn probability(self) -> f64 {
        match self.total() {
            0 => NO_INFORMATION,
            _ => {
                let p1 = self.p1_wins as f64;
                p1 / (p1 + self.p2_wins as f64)
            }
        }
    }

    pub fn credit(&mut self, winner: Player) {
        match winner {
            Player::One => self.p1_wins = self.p1_wins.saturating_add(1),
            Player::Two => self.p2_wins = self.p2_wins.saturating_add(1),
        }
    }
}

/// Synchronous, side-effect-free lookup of path evidence.
pub trait ProbabilityOracle {
    /// Raw evidence for an exact path key, `None` on a miss
    fn lookup(&self, key: &PathKey) -> Option<Evidence>;

    /// Probability that the path favored player one, defaulting to 0.5
    fn probability(&self, key: &PathKey) -> f64 {
        self.lookup(key)
            .map_or(NO_INFORMATION, Evidence::probability)
    }
}

impl<O: ProbabilityOracle + ?Sized> ProbabilityOracle for &O {
    fn lookup(&self, key: &PathKey) -> Option<Evidence> {
        (**self).lookup(key)
    }
}

/// Oracle with no data at all: every edge is an even split.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInformation;

impl ProbabilityOracle for NoInformation {
    fn lookup(&self, _key: &PathKey) -> Option<Evidence> {
        None
    }
}

/// Errors reading or writing a persisted path table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access path table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed path table: {0}")]
    Format(#[from] serde_json::Error),
}

/// In-memory table of win counts keyed by path string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTable {
    paths: HashMap<String, WinCounts>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `winner` on an exact path
    pub fn record(&mut self, key: &PathKey, winner: Player) {
        self.paths
            .entry(key.as_str().to_owned())
            .or_default()
            .credit(winner);
    }

    /// Overwrite the counts for a path
    pub fn insert(&mut self, key: &PathKey, counts: WinCounts) {
        self.paths.insert(key.as_str().to_owned(), counts);
    }

    pub fn get(&self, key: &str) -> Option<WinCounts> {
        self.paths.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Add every count of `other` into this table
    pub fn merge(&mut self, other: PathTable) {
        for (path, counts) in other.paths {
            let entry = self.paths.entry(path).or_default();
            entry.p1_wins = entry.p1_wins.saturating_add(counts.p1_wins);
            entry.p2_wins = entry.p2_wins.saturating_add(counts.p2_wins);
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let table: PathTable = serde_json::from_str(json)?;
        let empty = table.paths.values().filter(|c| c.total() == 0).count();
        if empty > 0 {
            log::warn!("path table holds {} entries with no recorded games", empty);
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a table previously written with [`PathTable::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        log::debug!("loaded {} paths from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ProbabilityOracle for PathTable {
    fn lookup(&self, key: &PathKey) -> Option<Evidence> {
        self.get(key.as_str()).map(Evidence::Counts)
    }
}
