//! Transaction-level scoring against a loaded artifact.

use crate::error::PipelineError;
use crate::models::artifact::ModelArtifact;
use tracing::debug;

/// Stateless pass-through from joined feature rows to risk probabilities.
///
/// The artifact is an immutable value passed in by the caller; the scorer
/// holds no state of its own beyond the borrow.
pub struct TransactionScorer<'a> {
    artifact: &'a ModelArtifact,
}

impl<'a> TransactionScorer<'a> {
    pub fn new(artifact: &'a ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Score every feature row, returning one probability per row.
    ///
    /// A row width differing from the artifact's trained feature count is a
    /// training/inference contract violation and fails the run; it is never
    /// coerced.
    pub fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        let expected = self.artifact.feature_count();
        for row in rows {
            if row.len() != expected {
                return Err(PipelineError::FeatureSkew {
                    expected,
                    actual: row.len(),
                });
            }
        }

        let scores = self.artifact.model.predict_batch(rows);
        debug!(rows = rows.len(), "Transactions scored");
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gbdt::{GbdtParams, GradientBoostedTrees};

    fn artifact() -> ModelArtifact {
        let x: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![if i % 2 == 0 { 4.0 } else { -4.0 }, 0.5])
            .collect();
        let y: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let model = GradientBoostedTrees::fit(&x, &y, GbdtParams::default()).unwrap();
        ModelArtifact::new(model, vec!["a".to_string(), "b".to_string()])
    }

    #[test]
    fn scores_one_probability_per_row() {
        let artifact = artifact();
        let scorer = TransactionScorer::new(&artifact);

        let rows = vec![vec![4.0, 0.5], vec![-4.0, 0.5], vec![0.0, 0.5]];
        let scores = scorer.score(&rows).unwrap();

        assert_eq!(scores.len(), rows.len());
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn mismatched_row_width_is_fatal_skew() {
        let artifact = artifact();
        let scorer = TransactionScorer::new(&artifact);

        let err = scorer.score(&[vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FeatureSkew {
                expected: 2,
                actual: 3
            }
        ));
    }
}
