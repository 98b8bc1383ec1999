use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use haushalt_core::{BankRecord, UserTransaction};

/// A user transaction with its statement counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub user: UserTransaction,
    pub bank: BankRecord,
}

/// Why a same-date pairing failed to reconcile cleanly. Amount is checked
/// before direction, so a pair that is wrong on both counts reports the
/// amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MismatchReason {
    Amount,
    Kind,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::Amount => write!(f, "amount mismatch"),
            MismatchReason::Kind => write!(f, "type mismatch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub user: UserTransaction,
    pub bank: BankRecord,
    pub reason: MismatchReason,
}

/// One comparison run's classification of every input record. Built fresh
/// per [`compare`] call and discarded afterwards; runs are never merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub matched: Vec<MatchedPair>,
    pub mismatched: Vec<Mismatch>,
    pub user_only: Vec<UserTransaction>,
    pub bank_only: Vec<BankRecord>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompareError {
    #[error("no user transactions to compare")]
    NoUserTransactions,
    #[error("no bank records to compare")]
    NoBankRecords,
}

/// Sub-cent differences are floating noise from bank exports, not real
/// discrepancies. Fixed absolute tolerance of 0.01.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn amounts_agree(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < tolerance()
}

/// Reconcile user transactions against a statement.
///
/// A single greedy pass over `users` in their given order. Each transaction
/// searches the not-yet-consumed bank records, in original statement order,
/// first for an exact match (same date, amount within tolerance, direction
/// agreement) and failing that for a same-date mismatch. A bank record
/// consumed by an earlier transaction is gone for good — a later transaction
/// cannot reclaim it even when it would be the better fit. Leftovers on
/// either side end up in `user_only` / `bank_only`.
///
/// Empty input on either side is a refused precondition, not an empty
/// result.
pub fn compare(
    users: &[UserTransaction],
    bank: &[BankRecord],
) -> Result<ReconciliationResult, CompareError> {
    if users.is_empty() {
        return Err(CompareError::NoUserTransactions);
    }
    if bank.is_empty() {
        return Err(CompareError::NoBankRecords);
    }

    let mut consumed = vec![false; bank.len()];
    let mut matched = Vec::new();
    let mut mismatched = Vec::new();
    let mut user_only = Vec::new();

    for user in users {
        let exact = (0..bank.len()).find(|&i| {
            !consumed[i]
                && bank[i].date == user.date
                && amounts_agree(user.amount, bank[i].amount)
                && user.kind.agrees_with(bank[i].flow)
        });
        if let Some(i) = exact {
            consumed[i] = true;
            matched.push(MatchedPair {
                user: user.clone(),
                bank: bank[i].clone(),
            });
            continue;
        }

        let near = (0..bank.len()).find(|&i| !consumed[i] && bank[i].date == user.date);
        if let Some(i) = near {
            consumed[i] = true;
            let reason = if !amounts_agree(user.amount, bank[i].amount) {
                MismatchReason::Amount
            } else {
                MismatchReason::Kind
            };
            mismatched.push(Mismatch {
                user: user.clone(),
                bank: bank[i].clone(),
                reason,
            });
            continue;
        }

        user_only.push(user.clone());
    }

    let bank_only: Vec<BankRecord> = bank
        .iter()
        .zip(&consumed)
        .filter(|(_, used)| !**used)
        .map(|(rec, _)| rec.clone())
        .collect();

    debug!(
        matched = matched.len(),
        mismatched = mismatched.len(),
        user_only = user_only.len(),
        bank_only = bank_only.len(),
        "comparison finished"
    );

    Ok(ReconciliationResult {
        matched,
        mismatched,
        user_only,
        bank_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use haushalt_core::{Flow, TxKind};
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn user(id: &str, d: &str, amount: &str, kind: TxKind) -> UserTransaction {
        UserTransaction {
            id: id.to_string(),
            date: date(d),
            amount: dec(amount),
            category: "General".to_string(),
            kind,
            description: String::new(),
        }
    }

    fn rec(d: &str, amount: &str, flow: Flow) -> BankRecord {
        BankRecord {
            date: date(d),
            description: String::new(),
            amount: dec(amount),
            flow,
        }
    }

    #[test]
    fn exact_match_lands_only_in_matched() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![rec("2024-01-05", "50.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert!(result.mismatched.is_empty());
        assert!(result.user_only.is_empty());
        assert!(result.bank_only.is_empty());
    }

    #[test]
    fn amount_difference_is_amount_mismatch() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![rec("2024-01-05", "55.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.mismatched.len(), 1);
        assert_eq!(result.mismatched[0].reason, MismatchReason::Amount);
        assert_eq!(result.mismatched[0].reason.to_string(), "amount mismatch");
    }

    #[test]
    fn direction_difference_is_type_mismatch() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Income)];
        let bank = vec![rec("2024-01-05", "50.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.mismatched.len(), 1);
        assert_eq!(result.mismatched[0].reason, MismatchReason::Kind);
        assert_eq!(result.mismatched[0].reason.to_string(), "type mismatch");
    }

    #[test]
    fn amount_reason_wins_when_both_differ() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Income)];
        let bank = vec![rec("2024-01-05", "60.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.mismatched[0].reason, MismatchReason::Amount);
    }

    #[test]
    fn tolerance_is_strictly_below_one_cent() {
        let users = vec![
            user("close", "2024-01-05", "50.009", TxKind::Expense),
            user("far", "2024-01-06", "50.011", TxKind::Expense),
        ];
        let bank = vec![
            rec("2024-01-05", "50.00", Flow::Debit),
            rec("2024-01-06", "50.00", Flow::Debit),
        ];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].user.id, "close");
        assert_eq!(result.mismatched.len(), 1);
        assert_eq!(result.mismatched[0].user.id, "far");
        assert_eq!(result.mismatched[0].reason, MismatchReason::Amount);
    }

    #[test]
    fn unmatched_records_fall_through_to_orphan_buckets() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![rec("2024-02-01", "50.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert!(result.matched.is_empty());
        assert!(result.mismatched.is_empty());
        assert_eq!(result.user_only.len(), 1);
        assert_eq!(result.bank_only.len(), 1);
    }

    #[test]
    fn earlier_transaction_keeps_the_contested_record() {
        // Both users fit the single bank record; the first one in input
        // order consumes it and the second goes unmatched.
        let users = vec![
            user("first", "2024-01-05", "50.00", TxKind::Expense),
            user("second", "2024-01-05", "50.00", TxKind::Expense),
        ];
        let bank = vec![rec("2024-01-05", "50.00", Flow::Debit)];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].user.id, "first");
        assert_eq!(result.user_only.len(), 1);
        assert_eq!(result.user_only[0].id, "second");
    }

    #[test]
    fn first_remaining_bank_record_wins_ties() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![
            rec("2024-01-05", "50.00", Flow::Debit),
            rec("2024-01-05", "50.00", Flow::Debit),
        ];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.bank_only.len(), 1);
    }

    #[test]
    fn exact_match_beats_earlier_mismatch_candidate() {
        // A same-date record with the wrong amount sits first in the
        // statement; the exact search must skip past it.
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![
            rec("2024-01-05", "99.00", Flow::Debit),
            rec("2024-01-05", "50.00", Flow::Debit),
        ];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].bank.amount, dec("50.00"));
        assert_eq!(result.bank_only.len(), 1);
        assert_eq!(result.bank_only[0].amount, dec("99.00"));
    }

    #[test]
    fn conservation_across_buckets() {
        let users = vec![
            user("a", "2024-01-05", "50.00", TxKind::Expense),
            user("b", "2024-01-06", "10.00", TxKind::Income),
            user("c", "2024-01-07", "7.50", TxKind::Expense),
            user("d", "2024-03-01", "1.00", TxKind::Expense),
        ];
        let bank = vec![
            rec("2024-01-05", "50.00", Flow::Debit),
            rec("2024-01-06", "12.00", Flow::Credit),
            rec("2024-02-01", "99.99", Flow::Debit),
        ];
        let result = compare(&users, &bank).unwrap();
        assert_eq!(
            result.matched.len() + result.mismatched.len() + result.user_only.len(),
            users.len()
        );
        assert_eq!(
            result.matched.len() + result.mismatched.len() + result.bank_only.len(),
            bank.len()
        );
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let users = vec![
            user("a", "2024-01-05", "50.00", TxKind::Expense),
            user("b", "2024-01-05", "50.00", TxKind::Expense),
        ];
        let bank = vec![
            rec("2024-01-05", "50.00", Flow::Debit),
            rec("2024-01-05", "51.00", Flow::Debit),
        ];
        let first = compare(&users, &bank).unwrap();
        let second = compare(&users, &bank).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_inputs_are_refused() {
        let users = vec![user("a", "2024-01-05", "50.00", TxKind::Expense)];
        let bank = vec![rec("2024-01-05", "50.00", Flow::Debit)];
        assert_eq!(compare(&[], &bank), Err(CompareError::NoUserTransactions));
        assert_eq!(compare(&users, &[]), Err(CompareError::NoBankRecords));
    }
}
