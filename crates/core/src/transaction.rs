use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::Flow;

/// Direction of a user-entered transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    /// An income entry should show up on the statement as money in,
    /// an expense as money out.
    pub fn agrees_with(self, flow: Flow) -> bool {
        matches!(
            (self, flow),
            (TxKind::Income, Flow::Credit) | (TxKind::Expense, Flow::Debit)
        )
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Income => write!(f, "income"),
            TxKind::Expense => write!(f, "expense"),
        }
    }
}

/// A transaction the user recorded by hand. Owned by the caller; the
/// reconciliation pipeline only reads these.
///
/// `amount` is a non-negative magnitude — direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub kind: TxKind,
    #[serde(default)]
    pub description: String,
}
