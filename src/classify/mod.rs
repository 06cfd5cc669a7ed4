//! Ensemble voting and level assignment.

mod confidence;
mod ensemble;
mod hierarchy;

pub use confidence::{ConfidenceScorer, VoteTally};
pub use ensemble::{EnsembleVoter, Verdict};
pub use hierarchy::HierarchyClassifier;
