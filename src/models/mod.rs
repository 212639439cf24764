//! Classifier, persistence, scoring, and score pooling

pub mod aggregator;
pub mod artifact;
pub mod gbdt;
pub mod scorer;

pub use aggregator::AccountAggregator;
pub use artifact::ModelArtifact;
pub use gbdt::{GbdtParams, GradientBoostedTrees, ModelError};
pub use scorer::TransactionScorer;
