//! Held-out evaluation metrics for the binary risk classifier.

/// Area under the ROC curve for probability scores against 0/1 labels.
///
/// Trapezoid rule over the ranked scores, with tied scores collapsed into a
/// single ROC point. Returns 0.5 when only one class is present.
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), scores.len());
    let n = labels.len();

    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(labels.iter())
        .map(|(&s, &l)| (s, l >= 0.5))
        .collect();
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let n_pos = pairs.iter().filter(|(_, positive)| *positive).count() as f64;
    let n_neg = n as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    let mut auc = 0.0;
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut tpr_prev = 0.0;
    let mut fpr_prev = 0.0;

    let mut i = 0;
    while i < n {
        // Advance over all points sharing this score
        let score = pairs[i].0;
        let mut j = i;
        while j < n && (pairs[j].0 - score).abs() < 1e-12 {
            if pairs[j].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            j += 1;
        }

        let tpr = tp / n_pos;
        let fpr = fp / n_neg;
        auc += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;

        tpr_prev = tpr;
        fpr_prev = fpr;
        i = j;
    }

    auc
}

/// Binary cross-entropy of probability scores against 0/1 labels.
pub fn log_loss(labels: &[f64], scores: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), scores.len());
    if labels.is_empty() {
        return 0.0;
    }

    let eps = 1e-15;
    -labels
        .iter()
        .zip(scores.iter())
        .map(|(&l, &s)| {
            let p = s.clamp(eps, 1.0 - eps);
            l * p.ln() + (1.0 - l) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_scores_one() {
        let labels = vec![0.0, 0.0, 1.0, 1.0];
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc(&labels, &scores) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn reversed_ranking_scores_zero() {
        let labels = vec![1.0, 1.0, 0.0, 0.0];
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        assert!(roc_auc(&labels, &scores).abs() < 1e-10);
    }

    #[test]
    fn uninformative_scores_near_half() {
        let labels = vec![0.0, 1.0, 0.0, 1.0];
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&labels, &scores) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn single_class_defaults_to_half() {
        let labels = vec![0.0, 0.0, 0.0];
        let scores = vec![0.1, 0.5, 0.9];
        assert_eq!(roc_auc(&labels, &scores), 0.5);
    }

    #[test]
    fn partial_ranking_matches_hand_computation() {
        // One inversion among 2 pos x 2 neg pairs: AUC = 3/4
        let labels = vec![1.0, 0.0, 1.0, 0.0];
        let scores = vec![0.9, 0.8, 0.6, 0.4];
        assert!((roc_auc(&labels, &scores) - 0.75).abs() < 1e-10);
    }

    #[test]
    fn log_loss_penalizes_confident_mistakes() {
        let labels = vec![1.0, 0.0];
        let good = log_loss(&labels, &[0.9, 0.1]);
        let bad = log_loss(&labels, &[0.1, 0.9]);
        assert!(good < bad);
    }
}
