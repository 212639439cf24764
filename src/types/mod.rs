//! Data types shared across the pipeline

pub mod report;
pub mod transaction;

pub use report::AccountRiskRow;
pub use transaction::Transaction;
