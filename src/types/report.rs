//! Account risk report rows

use crate::feature_extractor::AccountFeatures;
use serde::{Deserialize, Serialize};

/// One row of the account risk report: the account's behavioral aggregates
/// plus its pooled model risk score as a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRiskRow {
    pub account_id: u64,
    pub outgoing_tx_count: f64,
    pub avg_outgoing_value: f64,
    pub total_outgoing_value: f64,
    pub incoming_tx_count: f64,
    pub avg_incoming_value: f64,
    pub total_incoming_value: f64,
    /// Pooled risk in [0, 100], rounded to 2 decimals
    pub ml_risk_score: f64,
}

impl AccountRiskRow {
    pub fn new(account_id: u64, features: &AccountFeatures, ml_risk_score: f64) -> Self {
        Self {
            account_id,
            outgoing_tx_count: features.outgoing_tx_count,
            avg_outgoing_value: features.avg_outgoing_value,
            total_outgoing_value: features.total_outgoing_value,
            incoming_tx_count: features.incoming_tx_count,
            avg_incoming_value: features.avg_incoming_value,
            total_incoming_value: features.total_incoming_value,
            ml_risk_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_row_csv_round_trip() {
        let row = AccountRiskRow {
            account_id: 42,
            outgoing_tx_count: 3.0,
            avg_outgoing_value: 1200.0,
            total_outgoing_value: 3600.0,
            incoming_tx_count: 0.0,
            avg_incoming_value: 0.0,
            total_incoming_value: 0.0,
            ml_risk_score: 87.25,
        };

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(&row).unwrap();
        let data = wtr.into_inner().unwrap();

        let mut rdr = csv::Reader::from_reader(data.as_slice());
        let parsed: AccountRiskRow = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(parsed.account_id, 42);
        assert_eq!(parsed.ml_risk_score, 87.25);
    }
}
