//! Pipeline orchestration: TRAIN and SCORE modes.
//!
//! Both modes funnel through [`Pipeline::build_features`], which is the
//! single code path that realizes the feature contract. TRAIN fits the
//! classifier on a stratified split and persists the artifact; SCORE loads
//! the artifact, verifies the contract, scores, pools, and writes the
//! account risk report.

use crate::config::AppConfig;
use crate::dataset;
use crate::error::PipelineError;
use crate::feature_extractor::{AccountFeatures, FeatureExtractor};
use crate::metrics;
use crate::models::{
    AccountAggregator, GradientBoostedTrees, ModelArtifact, TransactionScorer,
};
use crate::types::report::AccountRiskRow;
use crate::types::transaction::Transaction;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of a TRAIN run
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Held-out ROC-AUC
    pub auc: f64,
    pub n_transactions: usize,
    pub n_train: usize,
    pub n_holdout: usize,
    pub artifact_path: PathBuf,
}

/// Result of a SCORE run
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub report_path: PathBuf,
    pub n_transactions: usize,
    pub n_accounts: usize,
    /// Highest pooled account risk in the report, as a percentage
    pub max_risk_score: f64,
}

struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
    feature_names: Vec<String>,
    accounts: BTreeMap<u64, AccountFeatures>,
}

/// Batch pipeline over an in-memory transaction set.
pub struct Pipeline {
    config: AppConfig,
    extractor: FeatureExtractor,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(),
        }
    }

    /// TRAIN: fit the classifier on labeled transactions, report held-out
    /// AUC, and persist the artifact.
    pub fn train<P: AsRef<Path>>(&self, input: P) -> Result<TrainOutcome, PipelineError> {
        let transactions = dataset::read_transactions(input)?;
        let labels = extract_labels(&transactions)?;
        let features = self.build_features(&transactions);

        let (train_idx, holdout_idx) = stratified_split(
            &labels,
            self.config.training.holdout_fraction,
            self.config.training.seed,
        );
        info!(
            train = train_idx.len(),
            holdout = holdout_idx.len(),
            "Stratified split complete"
        );

        let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| features.rows[i].clone()).collect();
        let y_train: Vec<f64> = train_idx.iter().map(|&i| labels[i]).collect();

        let params = self.config.model.to_params(self.config.training.seed);
        let model = GradientBoostedTrees::fit(&x_train, &y_train, params)?;

        let x_holdout: Vec<Vec<f64>> = holdout_idx
            .iter()
            .map(|&i| features.rows[i].clone())
            .collect();
        let y_holdout: Vec<f64> = holdout_idx.iter().map(|&i| labels[i]).collect();
        let holdout_scores = model.predict_batch(&x_holdout);
        let auc = metrics::roc_auc(&y_holdout, &holdout_scores);
        info!(auc, "Held-out evaluation complete");

        let artifact = ModelArtifact::new(model, features.feature_names);
        artifact.save(&self.config.paths.artifact)?;

        Ok(TrainOutcome {
            auc,
            n_transactions: transactions.len(),
            n_train: train_idx.len(),
            n_holdout: holdout_idx.len(),
            artifact_path: self.config.paths.artifact.clone(),
        })
    }

    /// SCORE: apply the persisted classifier to an unlabeled transaction
    /// set and write the account risk report.
    pub fn score<P: AsRef<Path>>(&self, input: P) -> Result<ScoreOutcome, PipelineError> {
        let transactions = dataset::read_transactions(input)?;
        let features = self.build_features(&transactions);

        let artifact = ModelArtifact::load(&self.config.paths.artifact)?;
        verify_feature_contract(&artifact, &features.feature_names)?;

        let scorer = TransactionScorer::new(&artifact);
        let scores = scorer.score(&features.rows)?;

        let pooled = AccountAggregator::pool(&transactions, &scores);
        let mut max_risk_score = 0.0_f64;
        let report: Vec<AccountRiskRow> = features
            .accounts
            .iter()
            .map(|(&account_id, account_features)| {
                let percent = AccountAggregator::to_percent(
                    pooled.get(&account_id).copied().unwrap_or(0.0),
                );
                max_risk_score = max_risk_score.max(percent);
                AccountRiskRow::new(account_id, account_features, percent)
            })
            .collect();

        dataset::write_report(&self.config.paths.report, &report)?;

        Ok(ScoreOutcome {
            report_path: self.config.paths.report.clone(),
            n_transactions: transactions.len(),
            n_accounts: report.len(),
            max_risk_score,
        })
    }

    /// The shared feature path: time features, account aggregates, join.
    fn build_features(&self, transactions: &[Transaction]) -> FeatureMatrix {
        let accounts = self.extractor.account_features(transactions);
        let joined = self.extractor.join(transactions, &accounts);

        if joined.malformed_timestamps > 0 {
            warn!(
                rows = joined.malformed_timestamps,
                "Unparseable timestamps; time features imputed to 0"
            );
        }
        info!(
            transactions = transactions.len(),
            accounts = accounts.len(),
            features = self.extractor.feature_count(),
            "Feature matrix built"
        );

        FeatureMatrix {
            rows: joined.rows,
            feature_names: self.extractor.feature_names(),
            accounts,
        }
    }
}

fn extract_labels(transactions: &[Transaction]) -> Result<Vec<f64>, PipelineError> {
    transactions
        .iter()
        .map(|tx| match tx.is_fraud {
            Some(fraud) => Ok(if fraud { 1.0 } else { 0.0 }),
            None => Err(PipelineError::Schema(format!(
                "train mode requires an is_fraud label on every row; transaction {} has none",
                tx.id
            ))),
        })
        .collect()
}

fn verify_feature_contract(
    artifact: &ModelArtifact,
    feature_names: &[String],
) -> Result<(), PipelineError> {
    if artifact.feature_count() != feature_names.len() {
        return Err(PipelineError::FeatureSkew {
            expected: artifact.feature_count(),
            actual: feature_names.len(),
        });
    }
    if artifact.feature_names != feature_names {
        return Err(PipelineError::Schema(
            "artifact feature names differ from the current feature contract; retrain the model"
                .to_string(),
        ));
    }
    Ok(())
}

/// Split row indices into train and holdout partitions, shuffled per class
/// so both partitions preserve the label balance. Reproducible per seed.
/// Classes with fewer than 2 members go entirely to the training side.
pub fn stratified_split(
    labels: &[f64],
    holdout_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut holdout = Vec::new();

    for class_positive in [false, true] {
        let mut class_indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| (l >= 0.5) == class_positive)
            .map(|(i, _)| i)
            .collect();

        if class_indices.len() < 2 {
            train.extend(class_indices);
            continue;
        }

        class_indices.shuffle(&mut rng);
        let n_holdout = ((class_indices.len() as f64 * holdout_fraction).round() as usize)
            .clamp(1, class_indices.len() - 1);

        holdout.extend(class_indices.drain(..n_holdout));
        train.extend(class_indices);
    }

    train.sort_unstable();
    holdout.sort_unstable();
    (train, holdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_preserves_both_classes() {
        let labels: Vec<f64> = (0..100).map(|i| if i < 20 { 1.0 } else { 0.0 }).collect();
        let (train, holdout) = stratified_split(&labels, 0.3, 42);

        assert_eq!(train.len() + holdout.len(), labels.len());
        let holdout_pos = holdout.iter().filter(|&&i| labels[i] >= 0.5).count();
        let train_pos = train.iter().filter(|&&i| labels[i] >= 0.5).count();
        assert_eq!(holdout_pos, 6); // 30% of 20
        assert_eq!(train_pos, 14);

        // No index appears on both sides
        for i in &holdout {
            assert!(!train.contains(i));
        }
    }

    #[test]
    fn split_is_reproducible_per_seed() {
        let labels: Vec<f64> = (0..50).map(|i| if i % 5 == 0 { 1.0 } else { 0.0 }).collect();

        let a = stratified_split(&labels, 0.3, 7);
        let b = stratified_split(&labels, 0.3, 7);
        assert_eq!(a, b);

        let c = stratified_split(&labels, 0.3, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn tiny_classes_stay_in_training() {
        let labels = vec![1.0, 0.0, 0.0, 0.0, 0.0];
        let (train, holdout) = stratified_split(&labels, 0.3, 42);

        // The single positive cannot be held out
        assert!(train.contains(&0));
        assert!(holdout.iter().all(|&i| labels[i] < 0.5));
    }

    #[test]
    fn labels_are_required_in_train_mode() {
        let tx = Transaction {
            id: 9,
            from_account: 1,
            to_account: 2,
            value: 100.0,
            timestamp: "2025-01-06T10:00:00".to_string(),
            is_legit_business: None,
            is_fraud: None,
        };
        let err = extract_labels(&[tx]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(err.to_string().contains("is_fraud"));
    }

    #[test]
    fn feature_contract_mismatch_is_skew() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![if i % 2 == 0 { 1.0 } else { -1.0 }])
            .collect();
        let y: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let model = GradientBoostedTrees::fit(
            &x,
            &y,
            crate::models::gbdt::GbdtParams::default(),
        )
        .unwrap();
        let artifact = ModelArtifact::new(model, vec!["only_one".to_string()]);

        let names: Vec<String> = vec!["a".to_string(), "b".to_string()];
        let err = verify_feature_contract(&artifact, &names).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FeatureSkew {
                expected: 1,
                actual: 2
            }
        ));
    }
}
