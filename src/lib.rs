//! AML Risk Pipeline Library
//!
//! Batch pipeline that turns a transaction ledger into per-account
//! fraud-risk scores: account-level feature engineering, gradient-boosted
//! transaction scoring, and max-pooled account risk reporting, with an
//! identical feature contract in the training and scoring paths.

pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod types;

pub use config::AppConfig;
pub use error::PipelineError;
pub use feature_extractor::{FeatureExtractor, FEATURE_NAMES};
pub use models::{AccountAggregator, ModelArtifact, TransactionScorer};
pub use pipeline::{Pipeline, ScoreOutcome, TrainOutcome};
pub use types::{report::AccountRiskRow, transaction::Transaction};
