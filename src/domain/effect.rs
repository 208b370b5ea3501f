//! Balance Mutation Engine
//!
//! Maps a transaction's (type, amount, endpoints) to the signed deltas it
//! causes on account balances. `revert_effects` is the exact inverse of
//! `apply_effects`: the decimal domain has no rounding, so applying one
//! after the other restores every touched balance bit-for-bit.
//!
//! The deltas are data, not mutations: the lifecycle manager hands them to
//! the store inside the same atomic unit of work as the record change, so a
//! transfer can never be observed with only one leg applied.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Transaction, TransactionType};

/// A signed delta to apply to one account's stored balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub account_id: Uuid,
    pub delta: Decimal,
}

impl BalanceChange {
    fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            delta: amount,
        }
    }

    fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            delta: -amount,
        }
    }
}

/// Deltas that record this transaction's effect on account balances.
///
/// INCOME credits the destination, EXPENSE debits the source, TRANSFER
/// debits the source and credits the destination.
pub fn apply_effects(tx: &Transaction) -> Vec<BalanceChange> {
    let amount = tx.amount.value();

    match tx.tx_type {
        TransactionType::Income => tx
            .to_account_id
            .map(|to| vec![BalanceChange::credit(to, amount)])
            .unwrap_or_default(),
        TransactionType::Expense => tx
            .from_account_id
            .map(|from| vec![BalanceChange::debit(from, amount)])
            .unwrap_or_default(),
        TransactionType::Transfer => match (tx.from_account_id, tx.to_account_id) {
            (Some(from), Some(to)) => vec![
                BalanceChange::debit(from, amount),
                BalanceChange::credit(to, amount),
            ],
            _ => Vec::new(),
        },
    }
}

/// Deltas that undo this transaction's effect: `apply_effects` negated.
pub fn revert_effects(tx: &Transaction) -> Vec<BalanceChange> {
    apply_effects(tx)
        .into_iter()
        .map(|change| BalanceChange {
            account_id: change.account_id,
            delta: -change.delta,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn transaction(
        tx_type: TransactionType,
        amount: &str,
        from: Option<Uuid>,
        to: Option<Uuid>,
    ) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            tx_type,
            amount: amount.parse::<Amount>().unwrap(),
            currency: "USD".to_string(),
            description: None,
            category: None,
            tags: Vec::new(),
            date: now,
            from_account_id: from,
            to_account_id: to,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_income_credits_destination() {
        let to = Uuid::new_v4();
        let tx = transaction(TransactionType::Income, "100.00", None, Some(to));

        let effects = apply_effects(&tx);
        assert_eq!(effects, vec![BalanceChange::credit(to, dec!(100.00))]);
    }

    #[test]
    fn test_expense_debits_source() {
        let from = Uuid::new_v4();
        let tx = transaction(TransactionType::Expense, "42.50", Some(from), None);

        let effects = apply_effects(&tx);
        assert_eq!(effects, vec![BalanceChange::debit(from, dec!(42.50))]);
    }

    #[test]
    fn test_transfer_moves_both_legs() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let tx = transaction(TransactionType::Transfer, "40.00", Some(from), Some(to));

        let effects = apply_effects(&tx);
        assert_eq!(
            effects,
            vec![
                BalanceChange::debit(from, dec!(40.00)),
                BalanceChange::credit(to, dec!(40.00)),
            ]
        );
    }

    #[test]
    fn test_revert_is_exact_inverse() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();

        for tx in [
            transaction(TransactionType::Income, "0.0001", None, Some(to)),
            transaction(TransactionType::Expense, "999999.99", Some(from), None),
            transaction(TransactionType::Transfer, "40.00", Some(from), Some(to)),
        ] {
            let applied = apply_effects(&tx);
            let reverted = revert_effects(&tx);
            assert_eq!(applied.len(), reverted.len());
            for (a, r) in applied.iter().zip(reverted.iter()) {
                assert_eq!(a.account_id, r.account_id);
                assert_eq!(a.delta + r.delta, Decimal::ZERO);
            }
        }
    }
}
