//! Gradient-boosted decision trees for binary risk classification.
//!
//! Logistic-loss boosting over depth-limited regression trees. Split search
//! is exhaustive and scanned in a fixed order, so a fit is fully reproducible
//! for a given seed; the RNG is used only for optional row subsampling.
//! The whole model serializes with serde, which is what makes the persisted
//! artifact round-trip exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// L2 regularization on leaf weights
const LAMBDA: f64 = 1.0;
/// Minimum split gain worth taking
const MIN_GAIN: f64 = 1e-6;

/// Errors that can occur while fitting or querying the model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty training set")]
    EmptyTrainingSet,

    #[error("feature/label length mismatch: {rows} rows vs {labels} labels")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("training labels contain a single class; cannot fit a binary classifier")]
    SingleClass,
}

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtParams {
    /// Number of boosting iterations (trees)
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Shrinkage applied to each tree's contribution
    pub learning_rate: f64,
    /// Minimum samples required in a leaf
    pub min_samples_leaf: usize,
    /// Row subsample ratio per tree (1.0 = no subsampling)
    pub subsample: f64,
    /// RNG seed for subsampling
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 3,
            learning_rate: 0.1,
            min_samples_leaf: 2,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// A single regression tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// A fitted gradient-boosted trees binary classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    params: GbdtParams,
    /// Log-odds of the positive-class prior
    base_score: f64,
    trees: Vec<Node>,
    n_features: usize,
}

impl GradientBoostedTrees {
    /// Fit a classifier on a feature matrix and 0/1 labels.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: GbdtParams) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(ModelError::ShapeMismatch {
                rows: x.len(),
                labels: y.len(),
            });
        }

        let n = x.len();
        let n_features = x[0].len();
        let n_pos = y.iter().filter(|&&l| l >= 0.5).count();
        if n_pos == 0 || n_pos == n {
            return Err(ModelError::SingleClass);
        }

        let prior = (n_pos as f64 / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_score = (prior / (1.0 - prior)).ln();

        info!(
            samples = n,
            features = n_features,
            positives = n_pos,
            n_trees = params.n_trees,
            max_depth = params.max_depth,
            "Fitting gradient-boosted trees"
        );

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut raw = vec![base_score; n];
        let mut trees = Vec::with_capacity(params.n_trees);

        for round in 0..params.n_trees {
            let mut grad = Vec::with_capacity(n);
            let mut hess = Vec::with_capacity(n);
            for (i, &label) in y.iter().enumerate() {
                let p = sigmoid(raw[i]);
                grad.push(label - p);
                hess.push((p * (1.0 - p)).max(1e-12));
            }

            let indices = sample_rows(n, params.subsample, params.min_samples_leaf, &mut rng);
            let tree = build_tree(x, &grad, &hess, &indices, 0, &params);

            for (i, row) in x.iter().enumerate() {
                raw[i] += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);

            if (round + 1) % 50 == 0 {
                debug!(round = round + 1, "Boosting progress");
            }
        }

        Ok(Self {
            params,
            base_score,
            trees,
            n_features,
        })
    }

    /// Predicted probability of the positive class for one feature row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut score = self.base_score;
        for tree in &self.trees {
            score += self.params.learning_rate * tree.predict(row);
        }
        sigmoid(score)
    }

    /// Predicted probabilities for a batch of rows.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_proba(row)).collect()
    }

    /// Number of features the model was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Hyperparameters the model was fitted with.
    pub fn params(&self) -> &GbdtParams {
        &self.params
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Deterministically pick the rows a tree is fit on.
fn sample_rows(n: usize, subsample: f64, min_samples_leaf: usize, rng: &mut StdRng) -> Vec<usize> {
    if subsample >= 1.0 {
        return (0..n).collect();
    }
    let keep = ((n as f64 * subsample).round() as usize).max(min_samples_leaf * 2).min(n);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(keep);
    indices.sort_unstable();
    indices
}

/// Recursively grow one regression tree on the gradient residuals.
/// Leaf values are Newton steps: sum(grad) / (sum(hess) + lambda).
fn build_tree(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    indices: &[usize],
    depth: usize,
    params: &GbdtParams,
) -> Node {
    let g_total: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = indices.iter().map(|&i| hess[i]).sum();
    let leaf = Node::Leaf {
        value: g_total / (h_total + LAMBDA),
    };

    if depth >= params.max_depth || indices.len() < 2 * params.min_samples_leaf {
        return leaf;
    }

    let n_features = x[indices[0]].len();
    let parent_score = g_total * g_total / (h_total + LAMBDA);

    let mut best_gain = MIN_GAIN;
    let mut best_split: Option<(usize, f64)> = None;

    for feature in 0..n_features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut g_left = 0.0;
        let mut h_left = 0.0;
        for k in 0..order.len() - 1 {
            g_left += grad[order[k]];
            h_left += hess[order[k]];

            // No valid threshold between equal values
            if x[order[k]][feature] == x[order[k + 1]][feature] {
                continue;
            }

            let n_left = k + 1;
            let n_right = order.len() - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let g_right = g_total - g_left;
            let h_right = h_total - h_left;
            let gain = g_left * g_left / (h_left + LAMBDA)
                + g_right * g_right / (h_right + LAMBDA)
                - parent_score;

            if gain > best_gain {
                best_gain = gain;
                let threshold = (x[order[k]][feature] + x[order[k + 1]][feature]) / 2.0;
                best_split = Some((feature, threshold));
            }
        }
    }

    match best_split {
        None => leaf,
        Some((feature, threshold)) => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x[i][feature] <= threshold);

            Node::Split {
                feature,
                threshold,
                left: Box::new(build_tree(x, grad, hess, &left_idx, depth + 1, params)),
                right: Box::new(build_tree(x, grad, hess, &right_idx, depth + 1, params)),
            }
        }
    }
}
