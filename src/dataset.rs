//! CSV input and report output.
//!
//! Reading is strict about schema (a missing required column fails the run
//! immediately) and lenient about per-row timestamps, which are carried as
//! raw strings and handled downstream.

use crate::error::PipelineError;
use crate::types::report::AccountRiskRow;
use crate::types::transaction::Transaction;
use std::path::Path;
use tracing::info;

const REQUIRED_COLUMNS: [&str; 5] = ["id", "from", "to", "value", "timestamp"];

/// Read the transaction ledger from a CSV file.
///
/// Fatal conditions: missing file, missing required column, malformed
/// non-timestamp field, empty file.
pub fn read_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, PipelineError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::InputFile(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(PipelineError::Schema(format!(
                "required column `{required}` is missing from {}",
                path.display()
            )));
        }
    }

    let transactions: Vec<Transaction> = reader
        .deserialize()
        .collect::<Result<_, csv::Error>>()
        .map_err(|e| PipelineError::Schema(format!("malformed row in {}: {e}", path.display())))?;

    if transactions.is_empty() {
        return Err(PipelineError::EmptyInput(path.to_path_buf()));
    }

    info!(
        path = %path.display(),
        transactions = transactions.len(),
        "Transactions loaded"
    );
    Ok(transactions)
}

/// Write the account risk report, one row per account.
pub fn write_report<P: AsRef<Path>>(
    path: P,
    rows: &[AccountRiskRow],
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(
        path = %path.display(),
        accounts = rows.len(),
        "Account risk report written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("aml_dataset_{}_{name}", std::process::id()))
    }

    #[test]
    fn reads_a_well_formed_ledger() {
        let path = temp_path("ok.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,from,to,value,timestamp,is_legit_business,is_fraud").unwrap();
        writeln!(file, "1,10,20,5000.0,2025-01-06T10:00:00,False,True").unwrap();
        writeln!(file, "2,20,30,750.5,2025-01-07T11:30:00,True,False").unwrap();
        drop(file);

        let transactions = read_transactions(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].from_account, 10);
        assert_eq!(transactions[0].is_fraud, Some(true));
        assert_eq!(transactions[1].value, 750.5);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_transactions("/nonexistent/transactions.csv").unwrap_err();
        assert!(matches!(err, PipelineError::InputFile(_)));
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let path = temp_path("no_value.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,from,to,timestamp").unwrap();
        writeln!(file, "1,10,20,2025-01-06T10:00:00").unwrap();
        drop(file);

        let err = read_transactions(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn empty_ledger_is_fatal() {
        let path = temp_path("empty.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,from,to,value,timestamp,is_legit_business,is_fraud").unwrap();
        drop(file);

        let err = read_transactions(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }

    #[test]
    fn malformed_timestamp_rows_still_load() {
        let path = temp_path("bad_ts.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,from,to,value,timestamp,is_legit_business,is_fraud").unwrap();
        writeln!(file, "1,10,20,5000.0,not-a-timestamp,False,False").unwrap();
        drop(file);

        let transactions = read_transactions(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(transactions.len(), 1);
        assert!(transactions[0].parsed_timestamp().is_none());
    }

    #[test]
    fn report_write_produces_expected_header() {
        let path = temp_path("report.csv");
        let rows = vec![AccountRiskRow {
            account_id: 1,
            outgoing_tx_count: 2.0,
            avg_outgoing_value: 100.0,
            total_outgoing_value: 200.0,
            incoming_tx_count: 0.0,
            avg_incoming_value: 0.0,
            total_incoming_value: 0.0,
            ml_risk_score: 12.5,
        }];

        write_report(&path, &rows).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(contents.starts_with(
            "account_id,outgoing_tx_count,avg_outgoing_value,total_outgoing_value,\
             incoming_tx_count,avg_incoming_value,total_incoming_value,ml_risk_score"
        ));
    }
}
