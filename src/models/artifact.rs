//! Persisted classifier artifact.
//!
//! The artifact bundles the fitted model with the ordered feature-name list
//! it was trained on, so the scoring path can verify the feature contract
//! before any prediction is made.

use crate::error::PipelineError;
use crate::models::gbdt::GradientBoostedTrees;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// A fitted classifier plus the metadata needed to apply it safely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Ordered feature names the model was trained against
    pub feature_names: Vec<String>,
    /// When the model was fitted
    pub trained_at: DateTime<Utc>,
    /// The fitted classifier
    pub model: GradientBoostedTrees,
}

impl ModelArtifact {
    pub fn new(model: GradientBoostedTrees, feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            trained_at: Utc::now(),
            model,
        }
    }

    /// Number of features the artifact expects per input row.
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Write the artifact as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(
            path = %path.display(),
            features = self.feature_count(),
            trees = self.model.n_trees(),
            "Model artifact saved"
        );
        Ok(())
    }

    /// Load an artifact from disk. A missing file is reported as
    /// [`PipelineError::MissingArtifact`] with guidance to run train mode.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::MissingArtifact(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            features = artifact.feature_count(),
            trees = artifact.model.n_trees(),
            trained_at = %artifact.trained_at,
            "Model artifact loaded"
        );
        Ok(artifact)
    }
}
