//! Account-level pooling of transaction risk scores.

use crate::types::transaction::Transaction;
use std::collections::BTreeMap;

/// Pools transaction-level risk scores into one score per account.
///
/// Max is commutative and associative, so the pooled result is independent
/// of transaction order.
pub struct AccountAggregator;

impl AccountAggregator {
    /// For every account appearing as sender or receiver, the maximum risk
    /// score over all of its transactions in either role, in [0, 1].
    ///
    /// `scores` must be positionally aligned with `transactions`.
    pub fn pool(transactions: &[Transaction], scores: &[f64]) -> BTreeMap<u64, f64> {
        debug_assert_eq!(transactions.len(), scores.len());
        let mut pooled: BTreeMap<u64, f64> = BTreeMap::new();

        for (tx, &score) in transactions.iter().zip(scores.iter()) {
            for account in [tx.from_account, tx.to_account] {
                let entry = pooled.entry(account).or_insert(0.0);
                if score > *entry {
                    *entry = score;
                }
            }
        }

        pooled
    }

    /// Convert a pooled [0, 1] score to the report percentage, rounded to
    /// 2 decimal places.
    pub fn to_percent(score: f64) -> f64 {
        (score * 100.0 * 100.0).round() / 100.0
    }
}
