//! bluff Tree Builder - Game tree construction module
//!
//! This crate builds game trees from a pair of starting hands and a
//! probability oracle and hands them to the engine for solving. It also
//! hosts the self-play tally that produces oracle tables and the end-to-end
//! hypothesis pipeline.

pub mod analysis;
pub mod builder;
pub mod selfplay;

pub use analysis::{analyze, Analysis, AnalysisError, HypothesisTree};
pub use builder::{build, TreeStats};
