use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a statement line: `Debit` is money out, `Credit` money in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Debit,
    Credit,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Debit => write!(f, "debit"),
            Flow::Credit => write!(f, "credit"),
        }
    }
}

/// One normalized line of an ingested bank statement.
///
/// `amount` is always a non-negative magnitude; the sign from the source
/// file has already been folded into `flow` by the ingestor. Rows whose
/// amount or date could not be parsed never become a `BankRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub flow: Flow,
}
