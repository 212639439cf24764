//! Feature engineering for transaction risk scoring.
//!
//! Derives per-transaction time features and per-account behavioral
//! aggregates, then joins them into flat feature rows. The training and
//! scoring paths both go through this module, so the feature definitions,
//! column order, and missing-value policy are identical in both by
//! construction.

use crate::types::transaction::Transaction;
use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;

/// The ordered feature column contract. The classifier is trained against
/// exactly this vector; any change here invalidates persisted artifacts.
pub const FEATURE_NAMES: [&str; 15] = [
    "value",
    "hour_of_day",
    "day_of_week",
    "outgoing_tx_count_from",
    "avg_outgoing_value_from",
    "total_outgoing_value_from",
    "incoming_tx_count_from",
    "avg_incoming_value_from",
    "total_incoming_value_from",
    "outgoing_tx_count_to",
    "avg_outgoing_value_to",
    "total_outgoing_value_to",
    "incoming_tx_count_to",
    "avg_incoming_value_to",
    "total_incoming_value_to",
];

/// Time-of-day features extracted from a transaction timestamp.
/// `None` means the timestamp failed to parse; the join imputes 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    /// 0-23
    pub hour_of_day: Option<u32>,
    /// 0-6, Monday = 0
    pub day_of_week: Option<u32>,
}

/// Behavioral aggregates for one account, split by role.
///
/// Every field defaults to 0 for a role the account never appears in; an
/// account is never dropped for being sender-only or receiver-only. The
/// table is recomputed from scratch on every run as a pure function of the
/// input transaction set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountFeatures {
    pub outgoing_tx_count: f64,
    pub avg_outgoing_value: f64,
    pub total_outgoing_value: f64,
    pub incoming_tx_count: f64,
    pub avg_incoming_value: f64,
    pub total_incoming_value: f64,
}

/// Result of joining transactions against the account feature table.
#[derive(Debug, Clone)]
pub struct JoinedFeatures {
    /// One row per input transaction, columns ordered as [`FEATURE_NAMES`]
    pub rows: Vec<Vec<f64>>,
    /// Transactions whose timestamp failed to parse (time features imputed)
    pub malformed_timestamps: usize,
}

/// Feature extractor for the transaction risk model.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Number of columns in a joined feature row.
    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    /// Ordered feature names, as stored in the model artifact.
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// Extract hour-of-day and day-of-week from a transaction timestamp.
    pub fn time_features(&self, tx: &Transaction) -> TimeFeatures {
        match tx.parsed_timestamp() {
            Some(ts) => TimeFeatures {
                hour_of_day: Some(ts.hour()),
                day_of_week: Some(ts.weekday().num_days_from_monday()),
            },
            None => TimeFeatures {
                hour_of_day: None,
                day_of_week: None,
            },
        }
    }

    /// Build the per-account aggregate table: count, mean, and sum of
    /// `value` grouped by sender for outgoing stats and by receiver for
    /// incoming stats, full-outer-merged over all account ids.
    pub fn account_features(&self, transactions: &[Transaction]) -> BTreeMap<u64, AccountFeatures> {
        let mut accounts: BTreeMap<u64, AccountFeatures> = BTreeMap::new();

        for tx in transactions {
            let outgoing = accounts.entry(tx.from_account).or_default();
            outgoing.outgoing_tx_count += 1.0;
            outgoing.total_outgoing_value += tx.value;

            let incoming = accounts.entry(tx.to_account).or_default();
            incoming.incoming_tx_count += 1.0;
            incoming.total_incoming_value += tx.value;
        }

        for features in accounts.values_mut() {
            if features.outgoing_tx_count > 0.0 {
                features.avg_outgoing_value =
                    features.total_outgoing_value / features.outgoing_tx_count;
            }
            if features.incoming_tx_count > 0.0 {
                features.avg_incoming_value =
                    features.total_incoming_value / features.incoming_tx_count;
            }
        }

        accounts
    }

    /// Join every transaction against the account table, producing exactly
    /// one feature row per transaction.
    ///
    /// The join is total: an account missing from the table contributes an
    /// all-zero feature vector, and unparseable timestamps impute their time
    /// features to 0 rather than dropping the row.
    pub fn join(
        &self,
        transactions: &[Transaction],
        accounts: &BTreeMap<u64, AccountFeatures>,
    ) -> JoinedFeatures {
        let zero = AccountFeatures::default();
        let mut rows = Vec::with_capacity(transactions.len());
        let mut malformed_timestamps = 0;

        for tx in transactions {
            let time = self.time_features(tx);
            if time.hour_of_day.is_none() {
                malformed_timestamps += 1;
            }

            let sender = accounts.get(&tx.from_account).unwrap_or(&zero);
            let receiver = accounts.get(&tx.to_account).unwrap_or(&zero);

            let mut row = Vec::with_capacity(FEATURE_NAMES.len());
            row.push(tx.value);
            row.push(time.hour_of_day.unwrap_or(0) as f64);
            row.push(time.day_of_week.unwrap_or(0) as f64);
            push_account_features(&mut row, sender);
            push_account_features(&mut row, receiver);
            debug_assert_eq!(row.len(), FEATURE_NAMES.len());

            rows.push(row);
        }

        JoinedFeatures {
            rows,
            malformed_timestamps,
        }
    }
}

fn push_account_features(row: &mut Vec<f64>, features: &AccountFeatures) {
    row.push(features.outgoing_tx_count);
    row.push(features.avg_outgoing_value);
    row.push(features.total_outgoing_value);
    row.push(features.incoming_tx_count);
    row.push(features.avg_incoming_value);
    row.push(features.total_incoming_value);
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
