//! Error taxonomy for the AML risk pipeline

use crate::models::gbdt::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline errors. Per-row timestamp parse failures are not errors:
/// they degrade to imputed time features and are counted, not raised.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputFile(PathBuf),

    #[error("input file contains no transactions: {0}")]
    EmptyInput(PathBuf),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("model artifact not found at {0}; run the train mode first to fit and save a model")]
    MissingArtifact(PathBuf),

    #[error("feature contract mismatch: artifact expects {expected} features, input rows have {actual}")]
    FeatureSkew { expected: usize, actual: usize },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("artifact serialization error: {0}")]
    Artifact(#[from] serde_json::Error),
}
