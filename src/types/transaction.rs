//! Transaction records as they appear in the input ledger

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A single ledger transaction between two accounts.
///
/// The timestamp is kept as the raw ISO-8601 string from the input file;
/// parsing happens lazily in feature extraction so that a malformed value
/// degrades to missing time features instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique, monotonically increasing transaction id
    pub id: u64,

    /// Sending account id
    #[serde(rename = "from")]
    pub from_account: u64,

    /// Receiving account id
    #[serde(rename = "to")]
    pub to_account: u64,

    /// Transferred amount (positive)
    pub value: f64,

    /// ISO-8601 timestamp, unvalidated
    pub timestamp: String,

    /// Whether the receiver is a known legitimate business
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_legit_business: Option<bool>,

    /// Fraud label, present only in labeled training data
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_fraud: Option<bool>,
}

impl Transaction {
    /// Parse the raw timestamp, tolerating both RFC 3339 and naive
    /// `YYYY-MM-DDTHH:MM:SS[.ffffff]` forms.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| self.timestamp.parse::<NaiveDateTime>().ok())
    }
}

/// Accepts `true`/`false` in any case, `1`/`0`, and empty cells.
///
/// Ledger exports produced by Python tooling spell booleans `True`/`False`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value `{other}`"
            ))),
        },
    }
}
